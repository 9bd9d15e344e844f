//! Admin-only coupon management.
//!
//! Every function takes the authenticated [`AdminUser`] so that callers cannot
//! reach the write side without going through token verification first.

use chrono::NaiveDate;

use crate::auth::AdminUser;
use crate::domain::coupon::Coupon;
use crate::domain::types::CouponId;
use crate::dto::coupons::{CouponCardDto, CouponDto};
use crate::forms::coupons::CouponFormPayload;
use crate::repository::{CouponListQuery, CouponReader, CouponWriter};

use super::{ServiceError, ServiceResult};

fn parse_coupon_id(coupon_id: i32) -> ServiceResult<CouponId> {
    CouponId::new(coupon_id).map_err(|_| ServiceError::NotFound)
}

/// All coupons for the management grid, newest first, with expiry badges.
pub fn list_admin_coupons<R>(
    _admin: &AdminUser,
    repo: &R,
    today: NaiveDate,
) -> ServiceResult<Vec<CouponCardDto>>
where
    R: CouponReader,
{
    match repo.list_coupons(CouponListQuery::default()) {
        Ok(coupons) => Ok(coupons
            .into_iter()
            .map(|coupon| CouponCardDto::new(coupon, today))
            .collect()),
        Err(e) => {
            log::error!("Failed to list coupons: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Load a coupon to prefill the edit form.
pub fn get_admin_coupon<R>(coupon_id: i32, _admin: &AdminUser, repo: &R) -> ServiceResult<Coupon>
where
    R: CouponReader,
{
    let coupon_id = parse_coupon_id(coupon_id)?;
    match repo.get_coupon_by_id(coupon_id) {
        Ok(Some(coupon)) => Ok(coupon),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get coupon {coupon_id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn create_coupon<R>(
    payload: CouponFormPayload,
    admin: &AdminUser,
    repo: &R,
) -> ServiceResult<CouponDto>
where
    R: CouponWriter,
{
    match repo.create_coupon(&payload.into_new_coupon()) {
        Ok(coupon) => {
            log::info!("{} created coupon {}", admin.username, coupon.id);
            Ok(coupon.into())
        }
        Err(e) => {
            log::error!("Failed to create coupon: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn update_coupon<R>(
    coupon_id: i32,
    payload: CouponFormPayload,
    admin: &AdminUser,
    repo: &R,
) -> ServiceResult<CouponDto>
where
    R: CouponWriter,
{
    let coupon_id = parse_coupon_id(coupon_id)?;

    match repo.update_coupon(coupon_id, &payload.into_new_coupon()) {
        Ok(Some(coupon)) => {
            log::info!("{} updated coupon {coupon_id}", admin.username);
            Ok(coupon.into())
        }
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to update coupon {coupon_id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn delete_coupon<R>(coupon_id: i32, admin: &AdminUser, repo: &R) -> ServiceResult<()>
where
    R: CouponWriter,
{
    let coupon_id = parse_coupon_id(coupon_id)?;

    match repo.delete_coupon(coupon_id) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => {
            log::info!("{} deleted coupon {coupon_id}", admin.username);
            Ok(())
        }
        Err(e) => {
            log::error!("Failed to delete coupon {coupon_id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn set_featured<R>(
    coupon_id: i32,
    featured: bool,
    admin: &AdminUser,
    repo: &R,
) -> ServiceResult<CouponDto>
where
    R: CouponWriter,
{
    let coupon_id = parse_coupon_id(coupon_id)?;

    match repo.set_coupon_featured(coupon_id, featured) {
        Ok(Some(coupon)) => {
            log::info!(
                "{} set featured={featured} on coupon {coupon_id}",
                admin.username
            );
            Ok(coupon.into())
        }
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to update featured flag of coupon {coupon_id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Flip the featured flag, as done by the dashboard button.
pub fn toggle_featured<R>(coupon_id: i32, admin: &AdminUser, repo: &R) -> ServiceResult<CouponDto>
where
    R: CouponReader + CouponWriter,
{
    let coupon = get_admin_coupon(coupon_id, admin, repo)?;
    set_featured(coupon_id, !coupon.featured, admin, repo)
}
