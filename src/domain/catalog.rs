//! In-memory filtering applied to the public coupon catalog.

use crate::domain::coupon::Coupon;
use crate::domain::types::{Category, TypeConstraintError};

/// Maximum number of coupons shown in the featured section.
pub const FEATURED_LIMIT: usize = 6;

/// Label of the pseudo-category that disables category filtering.
pub const ALL_CATEGORIES: &str = "All";

/// Category tab and search box state of the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// `None` means every category.
    pub category: Option<Category>,
    pub search: Option<String>,
}

impl CatalogFilter {
    /// Builds a filter from raw query parameters.
    ///
    /// A missing, blank or `All` category disables category filtering. Blank
    /// search strings are dropped.
    pub fn from_params(
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<Self, TypeConstraintError> {
        let category = match category.map(str::trim) {
            None | Some("") => None,
            Some(value) if value.eq_ignore_ascii_case(ALL_CATEGORIES) => None,
            Some(value) => Some(Category::try_from(value)?),
        };
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Ok(Self { category, search })
    }

    /// Label of the selected category tab.
    pub fn category_label(&self) -> &'static str {
        self.category.map_or(ALL_CATEGORIES, Category::as_str)
    }

    fn matches_search(&self, coupon: &Coupon) -> bool {
        self.search
            .as_deref()
            .is_none_or(|query| coupon.matches_search(query))
    }

    /// Coupons matching both the selected category and the search query.
    pub fn apply(&self, coupons: &[Coupon]) -> Vec<Coupon> {
        coupons
            .iter()
            .filter(|c| self.category.is_none_or(|category| c.category == category))
            .filter(|c| self.matches_search(c))
            .cloned()
            .collect()
    }

    /// Featured coupons matching the search query.
    ///
    /// The category tab never narrows this list.
    pub fn featured(&self, coupons: &[Coupon]) -> Vec<Coupon> {
        coupons
            .iter()
            .filter(|c| c.featured)
            .filter(|c| self.matches_search(c))
            .take(FEATURED_LIMIT)
            .cloned()
            .collect()
    }
}

/// Category tab labels: `All` followed by every category.
pub fn category_tabs() -> Vec<&'static str> {
    std::iter::once(ALL_CATEGORIES)
        .chain(Category::ALL.iter().map(|c| c.as_str()))
        .collect()
}
