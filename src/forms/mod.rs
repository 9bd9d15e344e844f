pub mod auth;
pub mod coupons;
pub mod import_export;
pub mod uploads;
