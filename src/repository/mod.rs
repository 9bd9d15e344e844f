use crate::db::{DbConnection, DbPool};
use crate::domain::coupon::{Coupon, CouponUpdate, NewCoupon};
use crate::domain::types::{Category, CouponCode, CouponId, StoreName};

pub mod coupon;
pub mod errors;
#[cfg(test)]
pub mod test;

pub use errors::{RepositoryError, RepositoryResult};

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Query parameters used when listing coupons.
#[derive(Debug, Clone, Default)]
pub struct CouponListQuery {
    /// Restrict to a single category.
    pub category: Option<Category>,
    /// Case-insensitive substring over store name, title and category.
    pub search: Option<String>,
    /// Only featured coupons.
    pub featured_only: bool,
}

impl CouponListQuery {
    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
    pub fn featured(mut self) -> Self {
        self.featured_only = true;
        self
    }
}

/// Read-only operations for coupon entities.
pub trait CouponReader {
    /// List coupons matching the query, newest first.
    fn list_coupons(&self, query: CouponListQuery) -> RepositoryResult<Vec<Coupon>>;
    /// Retrieve a coupon by its identifier.
    fn get_coupon_by_id(&self, id: CouponId) -> RepositoryResult<Option<Coupon>>;
    /// Retrieve the coupon a store publishes under `code`.
    fn find_coupon_by_store_and_code(
        &self,
        store_name: &StoreName,
        code: &CouponCode,
    ) -> RepositoryResult<Option<Coupon>>;
}

/// Write operations for coupon entities.
pub trait CouponWriter {
    /// Persist a new coupon and return it with its assigned id.
    fn create_coupon(&self, coupon: &NewCoupon) -> RepositoryResult<Coupon>;
    /// Replace every editable field. Returns `None` when the coupon is missing.
    fn update_coupon(&self, id: CouponId, update: &CouponUpdate)
    -> RepositoryResult<Option<Coupon>>;
    /// Set the featured flag. Returns `None` when the coupon is missing.
    fn set_coupon_featured(&self, id: CouponId, featured: bool)
    -> RepositoryResult<Option<Coupon>>;
    /// Delete a coupon, returning the number of removed rows.
    fn delete_coupon(&self, id: CouponId) -> RepositoryResult<usize>;
}
