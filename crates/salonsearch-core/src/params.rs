//! Backend-agnostic search request.
//!
//! [`SearchRequest`] is the raw, all-optional intake shape (query string or CLI
//! flags). [`SearchParameters`] is the validated, immutable form both query
//! compilers consume; the only way to build one is `TryFrom<SearchRequest>`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::geo::GeoPoint;
use crate::salon::{PriceTier, MAX_RATING, MIN_RATING};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Relevance,
    Rating,
    Distance,
    Newest,
    Reviews,
}

impl SortBy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::Relevance => "relevance",
            SortBy::Rating => "rating",
            SortBy::Distance => "distance",
            SortBy::Newest => "newest",
            SortBy::Reviews => "reviews",
        }
    }
}

impl std::fmt::Display for SortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "relevance" => Ok(SortBy::Relevance),
            "rating" => Ok(SortBy::Rating),
            "distance" => Ok(SortBy::Distance),
            "newest" => Ok(SortBy::Newest),
            "reviews" | "review_count" => Ok(SortBy::Reviews),
            other => Err(format!(
                "unknown sort '{other}'; expected relevance, rating, distance, newest or reviews"
            )),
        }
    }
}

/// Raw search input, before defaulting and validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    pub q: Option<String>,
    pub city: Option<String>,
    pub category: Option<i64>,
    pub price_range: Option<i16>,
    pub min_rating: Option<f64>,
    pub verified: Option<bool>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius: Option<f64>,
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Validated search parameters shared by both backends.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParameters {
    query: Option<String>,
    city: Option<String>,
    category_id: Option<i64>,
    price_tier: Option<PriceTier>,
    min_rating: Option<f64>,
    verified_only: bool,
    center: Option<GeoPoint>,
    radius_km: Option<f64>,
    sort: SortBy,
    page: u32,
    page_size: u32,
}

impl SearchParameters {
    /// Free-text query, `None` when absent or blank.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    #[must_use]
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    #[must_use]
    pub fn category_id(&self) -> Option<i64> {
        self.category_id
    }

    #[must_use]
    pub fn price_tier(&self) -> Option<PriceTier> {
        self.price_tier
    }

    #[must_use]
    pub fn min_rating(&self) -> Option<f64> {
        self.min_rating
    }

    #[must_use]
    pub fn verified_only(&self) -> bool {
        self.verified_only
    }

    /// Reference point for distance sorting and radius filtering.
    #[must_use]
    pub fn center(&self) -> Option<GeoPoint> {
        self.center
    }

    /// The radius filter, present only when both a center and radius were given.
    #[must_use]
    pub fn geo_radius(&self) -> Option<(GeoPoint, f64)> {
        self.center.zip(self.radius_km)
    }

    /// Sort policy as requested.
    #[must_use]
    pub fn sort(&self) -> SortBy {
        self.sort
    }

    /// Sort policy the compilers apply: distance without a center falls back
    /// to rating.
    #[must_use]
    pub fn effective_sort(&self) -> SortBy {
        match (self.sort, self.center) {
            (SortBy::Distance, None) => SortBy::Rating,
            (sort, _) => sort,
        }
    }

    /// True when results must carry a database-computed distance.
    #[must_use]
    pub fn sorts_by_distance(&self) -> bool {
        self.effective_sort() == SortBy::Distance
    }

    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Rows to skip: `(page - 1) * page_size`.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            query: None,
            city: None,
            category_id: None,
            price_tier: None,
            min_rating: None,
            verified_only: false,
            center: None,
            radius_km: None,
            sort: SortBy::Relevance,
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl TryFrom<SearchRequest> for SearchParameters {
    type Error = ValidationError;

    fn try_from(req: SearchRequest) -> Result<Self, Self::Error> {
        let mut errors = ValidationError::new();

        let price_tier = req.price_range.map(PriceTier);
        if let Some(tier) = price_tier {
            if !tier.is_valid() {
                errors.push("price_range", "must be between 1 and 4");
            }
        }

        if let Some(rating) = req.min_rating {
            if !(MIN_RATING..=MAX_RATING).contains(&rating) {
                errors.push("min_rating", "must be between 0 and 5");
            }
        }

        let center = match (req.lat, req.lon) {
            (Some(lat), Some(lon)) => {
                let point = GeoPoint::new(lat, lon);
                if !point.is_valid() {
                    errors.push("lat", "coordinates out of range");
                }
                Some(point)
            }
            (None, None) => None,
            (Some(_), None) => {
                errors.push("lon", "required when lat is given");
                None
            }
            (None, Some(_)) => {
                errors.push("lat", "required when lon is given");
                None
            }
        };

        if let Some(radius) = req.radius {
            if !(radius.is_finite() && radius > 0.0) {
                errors.push("radius", "must be a positive number of kilometres");
            }
            if req.lat.is_none() && req.lon.is_none() {
                errors.push("radius", "requires lat and lon");
            }
        }

        let sort = match req.sort.as_deref().map(str::parse::<SortBy>) {
            None => SortBy::default(),
            Some(Ok(sort)) => sort,
            Some(Err(msg)) => {
                errors.push("sort", msg);
                SortBy::default()
            }
        };

        errors.into_result()?;

        Ok(Self {
            query: non_blank(req.q),
            city: non_blank(req.city),
            category_id: req.category,
            price_tier,
            min_rating: req.min_rating,
            verified_only: req.verified.unwrap_or(false),
            center,
            radius_km: req.radius,
            sort,
            page: normalize_page(req.page),
            page_size: normalize_page_size(req.page_size),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Non-positive or missing pages become page 1.
fn normalize_page(page: Option<i64>) -> u32 {
    page.filter(|p| *p > 0)
        .map_or(DEFAULT_PAGE, |p| u32::try_from(p).unwrap_or(u32::MAX))
}

/// Non-positive or missing sizes become the default; oversized requests are capped.
fn normalize_page_size(size: Option<i64>) -> u32 {
    size.filter(|s| *s > 0).map_or(DEFAULT_PAGE_SIZE, |s| {
        u32::try_from(s).unwrap_or(MAX_PAGE_SIZE).min(MAX_PAGE_SIZE)
    })
}
