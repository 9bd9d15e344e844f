pub mod auth;
pub mod catalog;
pub mod coupons;
pub mod errors;
pub mod import_export;
pub mod uploads;

pub use errors::{ServiceError, ServiceResult};
