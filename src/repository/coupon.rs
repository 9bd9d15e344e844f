use chrono::Utc;
use diesel::prelude::*;

use crate::domain::coupon::{Coupon, CouponUpdate, NewCoupon};
use crate::domain::types::{CouponCode, CouponId, StoreName};
use crate::models::coupon::{Coupon as DbCoupon, NewCoupon as DbNewCoupon};
use crate::repository::{
    CouponListQuery, CouponReader, CouponWriter, DieselRepository, RepositoryResult,
};

impl CouponReader for DieselRepository {
    fn list_coupons(&self, query: CouponListQuery) -> RepositoryResult<Vec<Coupon>> {
        use crate::schema::coupons;

        let mut conn = self.conn()?;

        let mut items = coupons::table.into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(category) = query.category {
            items = items.filter(coupons::category.eq(category.as_str()));
        }
        if query.featured_only {
            items = items.filter(coupons::featured.eq(true));
        }

        let mut items = items
            .order((coupons::created_at.desc(), coupons::id.desc()))
            .load::<DbCoupon>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Coupon>, _>>()?;

        // SQLite LIKE only folds ASCII case, so search runs on domain values.
        if let Some(search) = query.search.as_deref() {
            items.retain(|coupon| coupon.matches_search(search));
        }

        Ok(items)
    }

    fn get_coupon_by_id(&self, id: CouponId) -> RepositoryResult<Option<Coupon>> {
        use crate::schema::coupons;

        let mut conn = self.conn()?;

        let coupon = coupons::table
            .find(id.get())
            .first::<DbCoupon>(&mut conn)
            .optional()?;

        let coupon = coupon.map(TryInto::try_into).transpose()?;
        Ok(coupon)
    }

    fn find_coupon_by_store_and_code(
        &self,
        store_name: &StoreName,
        code: &CouponCode,
    ) -> RepositoryResult<Option<Coupon>> {
        use crate::schema::coupons;

        let mut conn = self.conn()?;

        let coupon = coupons::table
            .filter(coupons::store_name.eq(store_name.as_str()))
            .filter(coupons::code.eq(code.as_str()))
            .order(coupons::id.asc())
            .first::<DbCoupon>(&mut conn)
            .optional()?;

        let coupon = coupon.map(TryInto::try_into).transpose()?;
        Ok(coupon)
    }
}

impl CouponWriter for DieselRepository {
    fn create_coupon(&self, coupon: &NewCoupon) -> RepositoryResult<Coupon> {
        use crate::schema::coupons;

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();
        let db_coupon = DbNewCoupon::from_domain(coupon, now);

        let created = diesel::insert_into(coupons::table)
            .values((&db_coupon, coupons::created_at.eq(now)))
            .get_result::<DbCoupon>(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn update_coupon(
        &self,
        id: CouponId,
        update: &CouponUpdate,
    ) -> RepositoryResult<Option<Coupon>> {
        use crate::schema::coupons;

        let mut conn = self.conn()?;
        let db_coupon = DbNewCoupon::from_domain(update, Utc::now().naive_utc());

        let updated = diesel::update(coupons::table.find(id.get()))
            .set(&db_coupon)
            .get_result::<DbCoupon>(&mut conn)
            .optional()?;

        Ok(updated.map(TryInto::try_into).transpose()?)
    }

    fn set_coupon_featured(
        &self,
        id: CouponId,
        featured: bool,
    ) -> RepositoryResult<Option<Coupon>> {
        use crate::schema::coupons;

        let mut conn = self.conn()?;

        let updated = diesel::update(coupons::table.find(id.get()))
            .set((
                coupons::featured.eq(featured),
                coupons::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbCoupon>(&mut conn)
            .optional()?;

        Ok(updated.map(TryInto::try_into).transpose()?)
    }

    fn delete_coupon(&self, id: CouponId) -> RepositoryResult<usize> {
        use crate::schema::coupons;

        let mut conn = self.conn()?;

        let affected = diesel::delete(coupons::table.find(id.get())).execute(&mut conn)?;

        Ok(affected)
    }
}
