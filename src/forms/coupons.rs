use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::coupon::NewCoupon;
use crate::domain::types::{
    Category, CouponCode, CouponDescription, CouponTitle, LogoUrl, StoreName, TypeConstraintError,
};

/// Date format of `expiry_date` on the wire and in `<input type="date">`.
pub const EXPIRY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Create/edit payload shared by the JSON API and the HTML form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CouponForm {
    #[validate(length(min = 1))]
    pub store_name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[validate(length(min = 1))]
    pub expiry_date: String,
    #[serde(default)]
    pub featured: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CouponFormPayload {
    pub store_name: StoreName,
    pub logo_url: Option<LogoUrl>,
    pub title: CouponTitle,
    pub code: CouponCode,
    pub description: CouponDescription,
    pub category: Category,
    pub expiry_date: NaiveDate,
    pub featured: bool,
}

impl CouponFormPayload {
    pub fn into_new_coupon(self) -> NewCoupon {
        NewCoupon {
            store_name: self.store_name,
            logo_url: self.logo_url,
            title: self.title,
            code: self.code,
            description: self.description,
            category: self.category,
            expiry_date: self.expiry_date,
            featured: self.featured,
        }
    }
}

#[derive(Debug, Error)]
pub enum CouponFormError {
    #[error("Please fill in all required fields")]
    MissingFields,
    #[error("Expiry date must be in YYYY-MM-DD format: {0}")]
    InvalidDate(String),
    #[error("Coupon form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for CouponFormError {
    fn from(_: ValidationErrors) -> Self {
        Self::MissingFields
    }
}

impl From<TypeConstraintError> for CouponFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<CouponForm> for CouponFormPayload {
    type Error = CouponFormError;

    fn try_from(value: CouponForm) -> Result<Self, Self::Error> {
        value.validate()?;

        let expiry_date = NaiveDate::parse_from_str(value.expiry_date.trim(), EXPIRY_DATE_FORMAT)
            .map_err(|_| CouponFormError::InvalidDate(value.expiry_date.clone()))?;

        let logo_url = value
            .logo_url
            .filter(|url| !url.trim().is_empty())
            .map(LogoUrl::new)
            .transpose()?;

        let category = match value.category.as_deref().map(str::trim) {
            None | Some("") => Category::default(),
            Some(category) => Category::try_from(category)?,
        };

        Ok(Self {
            store_name: StoreName::new(value.store_name)?,
            logo_url,
            title: CouponTitle::new(value.title)?,
            code: CouponCode::new(value.code)?,
            description: CouponDescription::new(value.description)?,
            category,
            expiry_date,
            featured: value.featured,
        })
    }
}

/// HTML variant of [`CouponForm`] that may carry a logo file.
///
/// A picked file wins over the `logo_url` text field.
#[derive(MultipartForm)]
pub struct CouponMultipartForm {
    pub store_name: Text<String>,
    pub logo_url: Option<Text<String>>,
    pub title: Text<String>,
    pub code: Text<String>,
    pub description: Text<String>,
    pub category: Option<Text<String>>,
    pub expiry_date: Text<String>,
    /// Checkbox; present only when ticked.
    pub featured: Option<Text<String>>,
    #[multipart(limit = "5MB")]
    pub logo: Option<TempFile>,
}

impl CouponMultipartForm {
    pub fn to_coupon_form(&self) -> CouponForm {
        CouponForm {
            store_name: self.store_name.to_string(),
            logo_url: self.logo_url.as_ref().map(|v| v.to_string()),
            title: self.title.to_string(),
            code: self.code.to_string(),
            description: self.description.to_string(),
            category: self.category.as_ref().map(|v| v.to_string()),
            expiry_date: self.expiry_date.to_string(),
            featured: self.featured.is_some(),
        }
    }

    /// The uploaded logo, ignoring the empty part browsers send when no file
    /// was picked.
    pub fn logo_file(&self) -> Option<&TempFile> {
        self.logo.as_ref().filter(|file| file.size > 0)
    }
}
