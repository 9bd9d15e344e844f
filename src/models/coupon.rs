use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::coupon::{Coupon as DomainCoupon, NewCoupon as DomainNewCoupon};
use crate::domain::types::{
    Category, CouponCode, CouponDescription, CouponTitle, LogoUrl, StoreName, TypeConstraintError,
};

/// Diesel model representing the `coupons` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::coupons)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Coupon {
    pub id: i32,
    pub store_name: String,
    pub logo_url: Option<String>,
    pub title: String,
    pub code: String,
    pub description: String,
    pub category: String,
    pub expiry_date: NaiveDate,
    pub featured: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable/patchable form of [`Coupon`].
///
/// `logo_url` is written even when `None` so that an update can clear it.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::coupons)]
#[diesel(treat_none_as_null = true)]
pub struct NewCoupon {
    pub store_name: String,
    pub logo_url: Option<String>,
    pub title: String,
    pub code: String,
    pub description: String,
    pub category: String,
    pub expiry_date: NaiveDate,
    pub featured: bool,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Coupon> for DomainCoupon {
    type Error = TypeConstraintError;

    fn try_from(coupon: Coupon) -> Result<Self, Self::Error> {
        Ok(Self {
            id: coupon.id.try_into()?,
            store_name: StoreName::new(coupon.store_name)?,
            logo_url: coupon.logo_url.map(LogoUrl::new).transpose()?,
            title: CouponTitle::new(coupon.title)?,
            code: CouponCode::new(coupon.code)?,
            description: CouponDescription::new(coupon.description)?,
            category: Category::try_from(coupon.category)?,
            expiry_date: coupon.expiry_date,
            featured: coupon.featured,
            created_at: coupon.created_at,
            updated_at: coupon.updated_at,
        })
    }
}

impl NewCoupon {
    /// Converts domain data into a row stamped with `updated_at`.
    pub fn from_domain(coupon: &DomainNewCoupon, updated_at: NaiveDateTime) -> Self {
        Self {
            store_name: coupon.store_name.as_str().to_string(),
            logo_url: coupon.logo_url.as_ref().map(|url| url.as_str().to_string()),
            title: coupon.title.as_str().to_string(),
            code: coupon.code.as_str().to_string(),
            description: coupon.description.as_str().to_string(),
            category: coupon.category.as_str().to_string(),
            expiry_date: coupon.expiry_date,
            featured: coupon.featured,
            updated_at,
        }
    }
}
