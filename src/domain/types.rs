//! Strongly-typed value objects used by domain entities.
//!
//! Domain structs should carry these wrappers instead of raw primitives so that
//! identifiers, text values and the category enum are enforced at the
//! boundary.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;
use validator::ValidateUrl;

/// Errors produced when attempting to construct constrained domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// An identifier was zero or negative.
    #[error("{0} must be greater than zero")]
    NonPositiveId(&'static str),
    /// A string was empty or whitespace-only after trimming.
    #[error("{0} cannot be empty")]
    EmptyString(&'static str),
    /// URL validation failed.
    #[error("{0} must be a valid URL")]
    InvalidUrl(&'static str),
    /// The value is not one of the known coupon categories.
    #[error("unknown category: {0}")]
    UnknownCategory(String),
}

fn trim_and_require_non_empty<S: Into<String>>(
    value: S,
    field: &'static str,
) -> Result<String, TypeConstraintError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
        Err(TypeConstraintError::EmptyString(field))
    } else {
        Ok(trimmed)
    }
}

/// Wrapper for non-empty, trimmed strings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Trims whitespace and rejects empty inputs.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        Self::new_for_field(value, "value")
    }

    /// Same as [`Self::new`] but with field-specific error context.
    pub fn new_for_field<S: Into<String>>(
        value: S,
        field: &'static str,
    ) -> Result<Self, TypeConstraintError> {
        trim_and_require_non_empty(value, field).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for NonEmptyString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Implements the read-only string accessors shared by every text newtype.
macro_rules! string_newtype_accessors {
    ($name:ident) => {
        impl $name {
            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                self.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }

        impl PartialEq<$name> for &str {
            fn eq(&self, other: &$name) -> bool {
                *self == other.as_str()
            }
        }
    };
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(
            Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId($field))
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<i32> for $name {
            fn eq(&self, other: &i32) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<$name> for i32 {
            fn eq(&self, other: &$name) -> bool {
                *self == other.0
            }
        }
    };
}

macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let inner = NonEmptyString::new_for_field(value, $field)?;
                Ok(Self(inner.into_inner()))
            }
        }

        string_newtype_accessors!($name);
    };
}

id_newtype!(CouponId, "Unique identifier for a coupon.", "coupon_id");

non_empty_string_newtype!(
    StoreName,
    "Name of the store offering the coupon.",
    "store name"
);
non_empty_string_newtype!(CouponTitle, "Short headline of the offer.", "title");
non_empty_string_newtype!(
    CouponDescription,
    "Free-form description of the offer.",
    "description"
);

/// Redeemable coupon code, stored upper-cased.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct CouponCode(String);

impl CouponCode {
    /// Trims, rejects empty input and upper-cases the code.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let trimmed = trim_and_require_non_empty(value, "code")?;
        Ok(Self(trimmed.to_uppercase()))
    }
}

string_newtype_accessors!(CouponCode);

/// Store logo location.
///
/// Either an absolute `http(s)` URL or a site-relative path such as the
/// `/uploads/...` paths handed out by the logo upload endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct LogoUrl(String);

impl LogoUrl {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let trimmed = trim_and_require_non_empty(value, "logo url")?;
        let site_relative = trimmed.starts_with('/') && !trimmed.starts_with("//");
        let lower = trimmed.to_ascii_lowercase();
        let http = lower.starts_with("http://") || lower.starts_with("https://");
        if !site_relative && !(http && trimmed.as_str().validate_url()) {
            return Err(TypeConstraintError::InvalidUrl("logo url"));
        }
        Ok(Self(trimmed))
    }
}

string_newtype_accessors!(LogoUrl);

/// Fixed set of coupon categories.
#[derive(
    Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    #[default]
    Fashion,
    Food,
    Electronics,
    Travel,
    Beauty,
    Health,
    Home,
    Education,
}

impl Category {
    /// Every category in display order.
    pub const ALL: [Category; 8] = [
        Category::Fashion,
        Category::Food,
        Category::Electronics,
        Category::Travel,
        Category::Beauty,
        Category::Health,
        Category::Home,
        Category::Education,
    ];

    /// String representation used in persistence and on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fashion => "Fashion",
            Self::Food => "Food",
            Self::Electronics => "Electronics",
            Self::Travel => "Travel",
            Self::Beauty => "Beauty",
            Self::Health => "Health",
            Self::Home => "Home",
            Self::Education => "Education",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for Category {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| TypeConstraintError::UnknownCategory(value.to_string()))
    }
}

impl TryFrom<String> for Category {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_non_empty_strings() {
        let value = StoreName::new("  Amazon  ").unwrap();
        assert_eq!(value.as_str(), "Amazon");
    }

    #[test]
    fn rejects_blank_strings_with_field_name() {
        let err = CouponTitle::new("   ").unwrap_err();
        assert_eq!(err, TypeConstraintError::EmptyString("title"));
    }

    #[test]
    fn rejects_non_positive_ids() {
        let err = CouponId::new(0).unwrap_err();
        assert_eq!(err, TypeConstraintError::NonPositiveId("coupon_id"));
    }

    #[test]
    fn upper_cases_coupon_codes() {
        let code = CouponCode::new(" save30 ").unwrap();
        assert_eq!(code, "SAVE30");
    }

    #[test]
    fn logo_url_accepts_absolute_and_site_relative_paths() {
        assert!(LogoUrl::new("https://cdn.example.com/logo.png").is_ok());
        assert!(LogoUrl::new("/uploads/logo.png").is_ok());
        assert_eq!(
            LogoUrl::new("//evil.example.com/x.png").unwrap_err(),
            TypeConstraintError::InvalidUrl("logo url")
        );
        assert!(LogoUrl::new("javascript:alert(1)").is_err());
        assert_eq!(
            LogoUrl::new("not a url").unwrap_err(),
            TypeConstraintError::InvalidUrl("logo url")
        );
    }

    #[test]
    fn parses_categories_case_insensitively() {
        assert_eq!(Category::try_from("electronics").unwrap(), Category::Electronics);
        assert_eq!(Category::try_from(" Home ").unwrap(), Category::Home);
        assert!(matches!(
            Category::try_from("All"),
            Err(TypeConstraintError::UnknownCategory(_))
        ));
    }

    #[test]
    fn category_serializes_as_display_name() {
        let json = serde_json::to_string(&Category::Travel).unwrap();
        assert_eq!(json, "\"Travel\"");
        let parsed: Category = serde_json::from_str("\"beauty\"").unwrap();
        assert_eq!(parsed, Category::Beauty);
    }
}
