use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::coupon::Coupon;
use crate::domain::types::Category;
use crate::forms::coupons::EXPIRY_DATE_FORMAT;

/// Wire representation of a coupon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CouponDto {
    pub id: i32,
    pub store_name: String,
    pub logo_url: Option<String>,
    pub title: String,
    pub code: String,
    pub description: String,
    pub category: &'static str,
    pub expiry_date: NaiveDate,
    pub featured: bool,
}

impl From<Coupon> for CouponDto {
    fn from(value: Coupon) -> Self {
        Self {
            id: value.id.get(),
            store_name: value.store_name.into_inner(),
            logo_url: value.logo_url.map(|url| url.into_inner()),
            title: value.title.into_inner(),
            code: value.code.into_inner(),
            description: value.description.into_inner(),
            category: value.category.as_str(),
            expiry_date: value.expiry_date,
            featured: value.featured,
        }
    }
}

/// Coupon decorated with the expiry badges shown on cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CouponCardDto {
    #[serde(flatten)]
    pub coupon: CouponDto,
    pub expiring_soon: bool,
    pub expired: bool,
}

impl CouponCardDto {
    pub fn new(coupon: Coupon, today: NaiveDate) -> Self {
        let expiring_soon = coupon.is_expiring_soon(today);
        let expired = coupon.is_expired(today);
        Self {
            coupon: coupon.into(),
            expiring_soon,
            expired,
        }
    }
}

/// Prefilled values of the admin create/edit form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CouponFormValues {
    pub store_name: String,
    pub logo_url: String,
    pub title: String,
    pub code: String,
    pub description: String,
    pub category: &'static str,
    pub expiry_date: String,
    pub featured: bool,
}

impl Default for CouponFormValues {
    fn default() -> Self {
        Self {
            store_name: String::new(),
            logo_url: String::new(),
            title: String::new(),
            code: String::new(),
            description: String::new(),
            category: Category::default().as_str(),
            expiry_date: String::new(),
            featured: false,
        }
    }
}

impl From<Coupon> for CouponFormValues {
    fn from(value: Coupon) -> Self {
        Self {
            store_name: value.store_name.into_inner(),
            logo_url: value
                .logo_url
                .map(|url| url.into_inner())
                .unwrap_or_default(),
            title: value.title.into_inner(),
            code: value.code.into_inner(),
            description: value.description.into_inner(),
            category: value.category.as_str(),
            expiry_date: value.expiry_date.format(EXPIRY_DATE_FORMAT).to_string(),
            featured: value.featured,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{
        CouponCode, CouponDescription, CouponId, CouponTitle, LogoUrl, StoreName,
    };
    use chrono::DateTime;

    fn coupon(expiry_date: NaiveDate) -> Coupon {
        let now = DateTime::from_timestamp(0, 0).unwrap().naive_utc();
        Coupon {
            id: CouponId::new(3).unwrap(),
            store_name: StoreName::new("Myntra").unwrap(),
            logo_url: Some(LogoUrl::new("https://cdn.example.com/myntra.png").unwrap()),
            title: CouponTitle::new("Extra 10%").unwrap(),
            code: CouponCode::new("MYN10").unwrap(),
            description: CouponDescription::new("On first order").unwrap(),
            category: Category::Fashion,
            expiry_date,
            featured: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn card_flags_follow_expiry() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let soon = CouponCardDto::new(coupon(NaiveDate::from_ymd_opt(2024, 6, 8).unwrap()), today);
        assert!(soon.expiring_soon && !soon.expired);

        let gone = CouponCardDto::new(coupon(NaiveDate::from_ymd_opt(2024, 5, 31).unwrap()), today);
        assert!(!gone.expiring_soon && gone.expired);
    }

    #[test]
    fn card_serializes_flat() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let card = CouponCardDto::new(coupon(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()), today);

        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["code"], "MYN10");
        assert_eq!(json["category"], "Fashion");
        assert_eq!(json["expiry_date"], "2025-01-01");
        assert_eq!(json["expiring_soon"], false);
    }

    #[test]
    fn form_values_prefill_from_coupon() {
        let values =
            CouponFormValues::from(coupon(NaiveDate::from_ymd_opt(2030, 2, 3).unwrap()));
        assert_eq!(values.expiry_date, "2030-02-03");
        assert_eq!(values.logo_url, "https://cdn.example.com/myntra.png");
        assert_eq!(CouponFormValues::default().category, "Fashion");
    }
}
