use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    Category, CouponCode, CouponDescription, CouponId, CouponTitle, LogoUrl, StoreName,
};

/// Number of days ahead of expiry during which a coupon is flagged.
pub const EXPIRING_SOON_DAYS: i64 = 7;

/// A discount code offered by a store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coupon {
    pub id: CouponId,
    pub store_name: StoreName,
    pub logo_url: Option<LogoUrl>,
    pub title: CouponTitle,
    pub code: CouponCode,
    pub description: CouponDescription,
    pub category: Category,
    pub expiry_date: NaiveDate,
    pub featured: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Coupon {
    /// Whole days between `today` and the expiry date. Negative once expired.
    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        (self.expiry_date - today).num_days()
    }

    /// True when the coupon expires within the next week but not today.
    pub fn is_expiring_soon(&self, today: NaiveDate) -> bool {
        let days = self.days_until_expiry(today);
        days > 0 && days <= EXPIRING_SOON_DAYS
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry_date < today
    }

    /// Case-insensitive substring match over store name, title and category.
    ///
    /// A blank query matches every coupon.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        [
            self.store_name.as_str(),
            self.title.as_str(),
            self.category.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&query))
    }
}

/// Data required to insert a new [`Coupon`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCoupon {
    pub store_name: StoreName,
    pub logo_url: Option<LogoUrl>,
    pub title: CouponTitle,
    pub code: CouponCode,
    pub description: CouponDescription,
    pub category: Category,
    pub expiry_date: NaiveDate,
    pub featured: bool,
}

/// Full replacement of the editable fields of an existing [`Coupon`].
pub type CouponUpdate = NewCoupon;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn coupon_expiring(expiry_date: NaiveDate) -> Coupon {
        let now = DateTime::from_timestamp(0, 0).unwrap().naive_utc();
        Coupon {
            id: CouponId::new(1).unwrap(),
            store_name: StoreName::new("Amazon").unwrap(),
            logo_url: None,
            title: CouponTitle::new("Flat 30% Off on Electronics").unwrap(),
            code: CouponCode::new("SAVE30").unwrap(),
            description: CouponDescription::new("Valid on all gadgets").unwrap(),
            category: Category::Electronics,
            expiry_date,
            featured: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn expiring_soon_window_is_one_to_seven_days() {
        let today = date(2024, 3, 10);

        assert!(!coupon_expiring(date(2024, 3, 10)).is_expiring_soon(today));
        assert!(coupon_expiring(date(2024, 3, 11)).is_expiring_soon(today));
        assert!(coupon_expiring(date(2024, 3, 17)).is_expiring_soon(today));
        assert!(!coupon_expiring(date(2024, 3, 18)).is_expiring_soon(today));
        assert!(!coupon_expiring(date(2024, 3, 1)).is_expiring_soon(today));
    }

    #[test]
    fn expired_only_after_expiry_day() {
        let today = date(2024, 3, 10);
        assert!(!coupon_expiring(date(2024, 3, 10)).is_expired(today));
        assert!(coupon_expiring(date(2024, 3, 9)).is_expired(today));
    }

    #[test]
    fn search_matches_store_title_and_category() {
        let coupon = coupon_expiring(date(2030, 1, 1));

        assert!(coupon.matches_search("amaz"));
        assert!(coupon.matches_search("30% OFF"));
        assert!(coupon.matches_search("electronics"));
        assert!(coupon.matches_search("   "));
        assert!(!coupon.matches_search("gadgets"));
        assert!(!coupon.matches_search("SAVE30"));
    }
}
