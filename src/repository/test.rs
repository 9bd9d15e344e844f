use std::sync::Mutex;

use chrono::DateTime;

use crate::domain::coupon::{Coupon, CouponUpdate, NewCoupon};
use crate::domain::types::{CouponCode, CouponId, StoreName};
use crate::repository::{CouponListQuery, CouponReader, CouponWriter, RepositoryResult};

/// Simple in-memory repository used for unit tests.
#[derive(Default)]
pub struct TestRepository {
    coupons: Mutex<Vec<Coupon>>,
}

impl TestRepository {
    pub fn new(coupons: Vec<Coupon>) -> Self {
        Self {
            coupons: Mutex::new(coupons),
        }
    }

    /// Snapshot of the stored coupons.
    pub fn coupons(&self) -> Vec<Coupon> {
        self.coupons.lock().unwrap().clone()
    }

    fn materialize(id: i32, data: &NewCoupon) -> Coupon {
        let now = DateTime::from_timestamp(0, 0).unwrap().naive_utc();
        Coupon {
            id: CouponId::new(id).unwrap(),
            store_name: data.store_name.clone(),
            logo_url: data.logo_url.clone(),
            title: data.title.clone(),
            code: data.code.clone(),
            description: data.description.clone(),
            category: data.category,
            expiry_date: data.expiry_date,
            featured: data.featured,
            created_at: now,
            updated_at: now,
        }
    }
}

impl CouponReader for TestRepository {
    fn list_coupons(&self, query: CouponListQuery) -> RepositoryResult<Vec<Coupon>> {
        let mut items = self.coupons();
        if let Some(category) = query.category {
            items.retain(|c| c.category == category);
        }
        if query.featured_only {
            items.retain(|c| c.featured);
        }
        if let Some(search) = query.search {
            items.retain(|c| c.matches_search(&search));
        }
        Ok(items)
    }

    fn get_coupon_by_id(&self, id: CouponId) -> RepositoryResult<Option<Coupon>> {
        Ok(self.coupons().into_iter().find(|c| c.id == id))
    }

    fn find_coupon_by_store_and_code(
        &self,
        store_name: &StoreName,
        code: &CouponCode,
    ) -> RepositoryResult<Option<Coupon>> {
        Ok(self
            .coupons()
            .into_iter()
            .find(|c| &c.store_name == store_name && &c.code == code))
    }
}

impl CouponWriter for TestRepository {
    fn create_coupon(&self, coupon: &NewCoupon) -> RepositoryResult<Coupon> {
        let mut coupons = self.coupons.lock().unwrap();
        let next_id = coupons.iter().map(|c| c.id.get()).max().unwrap_or(0) + 1;
        let created = Self::materialize(next_id, coupon);
        coupons.push(created.clone());
        Ok(created)
    }

    fn update_coupon(
        &self,
        id: CouponId,
        update: &CouponUpdate,
    ) -> RepositoryResult<Option<Coupon>> {
        let mut coupons = self.coupons.lock().unwrap();
        Ok(coupons.iter_mut().find(|c| c.id == id).map(|c| {
            *c = Self::materialize(id.get(), update);
            c.clone()
        }))
    }

    fn set_coupon_featured(
        &self,
        id: CouponId,
        featured: bool,
    ) -> RepositoryResult<Option<Coupon>> {
        let mut coupons = self.coupons.lock().unwrap();
        Ok(coupons.iter_mut().find(|c| c.id == id).map(|c| {
            c.featured = featured;
            c.clone()
        }))
    }

    fn delete_coupon(&self, id: CouponId) -> RepositoryResult<usize> {
        let mut coupons = self.coupons.lock().unwrap();
        let before = coupons.len();
        coupons.retain(|c| c.id != id);
        Ok(before - coupons.len())
    }
}
