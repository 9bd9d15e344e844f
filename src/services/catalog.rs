//! Public, unauthenticated read side of the catalog.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::{CatalogFilter, category_tabs};
use crate::domain::coupon::Coupon;
use crate::domain::types::{Category, CouponId};
use crate::dto::coupons::{CouponCardDto, CouponDto};
use crate::repository::{CouponListQuery, CouponReader};

use super::{ServiceError, ServiceResult};

/// Query parameters accepted by the coupon listings.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct CouponsQueryParams {
    pub category: Option<String>,
    pub search: Option<String>,
    /// Only featured coupons. Ignored by the catalog page.
    #[serde(default)]
    pub featured: bool,
}

impl CouponsQueryParams {
    fn to_filter(&self) -> ServiceResult<CatalogFilter> {
        Ok(CatalogFilter::from_params(
            self.category.as_deref(),
            self.search.as_deref(),
        )?)
    }
}

/// Response body of `GET /api/categories`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CategoriesResponse {
    pub categories: Vec<&'static str>,
}

/// Everything the catalog page renders.
#[derive(Serialize, Debug, Clone)]
pub struct CatalogPage {
    pub coupons: Vec<CouponCardDto>,
    pub featured: Vec<CouponCardDto>,
    pub categories: Vec<&'static str>,
    pub selected_category: &'static str,
    pub search: String,
}

/// Coupons for the JSON API, narrowed by optional category, search and the
/// featured flag.
pub fn list_coupons<R>(params: &CouponsQueryParams, repo: &R) -> ServiceResult<Vec<CouponDto>>
where
    R: CouponReader,
{
    let filter = params.to_filter()?;

    let mut query = CouponListQuery::default();
    if let Some(category) = filter.category {
        query = query.category(category);
    }
    if let Some(search) = filter.search {
        query = query.search(search);
    }
    if params.featured {
        query = query.featured();
    }

    match repo.list_coupons(query) {
        Ok(coupons) => Ok(coupons.into_iter().map(CouponDto::from).collect()),
        Err(e) => {
            log::error!("Failed to list coupons: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// The fixed category list in display order.
pub fn list_categories() -> CategoriesResponse {
    CategoriesResponse {
        categories: Category::ALL.iter().map(|c| c.as_str()).collect(),
    }
}

fn get_coupon<R>(coupon_id: i32, repo: &R) -> ServiceResult<Coupon>
where
    R: CouponReader,
{
    let coupon_id = CouponId::new(coupon_id).map_err(|_| ServiceError::NotFound)?;

    match repo.get_coupon_by_id(coupon_id) {
        Ok(Some(coupon)) => Ok(coupon),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get coupon {coupon_id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// A single coupon for the JSON API.
pub fn get_coupon_dto<R>(coupon_id: i32, repo: &R) -> ServiceResult<CouponDto>
where
    R: CouponReader,
{
    get_coupon(coupon_id, repo).map(CouponDto::from)
}

/// A single coupon for the detail page.
pub fn show_coupon<R>(coupon_id: i32, repo: &R, today: NaiveDate) -> ServiceResult<CouponCardDto>
where
    R: CouponReader,
{
    get_coupon(coupon_id, repo).map(|coupon| CouponCardDto::new(coupon, today))
}

/// Core business logic for rendering the catalog page.
///
/// All coupons are loaded once; the category tab and the search box are
/// applied in memory so the featured strip can ignore the tab.
pub fn show_catalog<R>(
    params: &CouponsQueryParams,
    repo: &R,
    today: NaiveDate,
) -> ServiceResult<CatalogPage>
where
    R: CouponReader,
{
    let filter = params.to_filter()?;

    let coupons = match repo.list_coupons(CouponListQuery::default()) {
        Ok(coupons) => coupons,
        Err(e) => {
            log::error!("Failed to list coupons: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let to_cards = |items: Vec<Coupon>| {
        items
            .into_iter()
            .map(|coupon| CouponCardDto::new(coupon, today))
            .collect::<Vec<_>>()
    };

    Ok(CatalogPage {
        featured: to_cards(filter.featured(&coupons)),
        coupons: to_cards(filter.apply(&coupons)),
        categories: category_tabs(),
        selected_category: filter.category_label(),
        search: filter.search.unwrap_or_default(),
    })
}
