//! Domain entities and value objects independent of storage and transport.

pub mod catalog;
pub mod coupon;
pub mod types;
