//! Conversions from form and domain errors into [`ServiceError`].
//!
//! Kept out of the domain and form modules so those stay free of the service
//! layer.

use crate::domain::types::TypeConstraintError;
use crate::forms::auth::LoginFormError;
use crate::forms::coupons::CouponFormError;
use crate::forms::import_export::UploadParseError;
use crate::services::ServiceError;
use crate::services::import_export::DownloadError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

impl From<CouponFormError> for ServiceError {
    fn from(val: CouponFormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<LoginFormError> for ServiceError {
    fn from(val: LoginFormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<UploadParseError> for ServiceError {
    fn from(val: UploadParseError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<DownloadError> for ServiceError {
    fn from(val: DownloadError) -> Self {
        match val {
            DownloadError::InvalidFormat(_) => ServiceError::Form(val.to_string()),
            _ => ServiceError::Internal,
        }
    }
}
