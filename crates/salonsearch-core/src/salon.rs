//! The `Salon` aggregate and the small value types hanging off it.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::error::ValidationError;
use crate::geo::GeoPoint;
use crate::hours::OperatingHours;
use crate::service::Service;

/// Maximum salon name length, counted in characters.
pub const MAX_NAME_LEN: usize = 255;

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 5.0;

/// Ordinal price tier. Valid tiers are 1 (`$`) through 4 (`$$$$`).
///
/// An unset tier is modelled as `Option::None` on the owning type, never as
/// tier 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PriceTier(pub i16);

impl PriceTier {
    pub const BUDGET: PriceTier = PriceTier(1);
    pub const MODERATE: PriceTier = PriceTier(2);
    pub const UPSCALE: PriceTier = PriceTier(3);
    pub const LUXURY: PriceTier = PriceTier(4);

    #[must_use]
    pub fn is_valid(self) -> bool {
        (1..=4).contains(&self.0)
    }

    /// Dollar-sign rendering, or an empty string for out-of-range tiers.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self.0 {
            1 => "$",
            2 => "$$",
            3 => "$$$",
            4 => "$$$$",
            _ => "",
        }
    }
}

impl std::fmt::Display for PriceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Postal address plus optional coordinates.
///
/// A location without coordinates can still be displayed but is excluded from
/// geo-radius filtering and distance sorting.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(flatten)]
    pub geo: Option<GeoPoint>,
}

impl Location {
    /// Joins the non-empty address parts with `", "`.
    #[must_use]
    pub fn full_address(&self) -> String {
        [
            &self.address,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.country,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// # Errors
    ///
    /// Returns every violated invariant when name or slug is blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        if self.name.trim().is_empty() {
            errors.push("name", "must not be empty");
        }
        if self.slug.trim().is_empty() {
            errors.push("slug", "must not be empty");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Amenity {
    pub id: i64,
    pub name: String,
}

/// A searchable business.
///
/// Read-only from the search layer's point of view. `services`, `amenities`
/// and `operating_hours` are only populated by the detail lookup and the
/// reindex export; search results leave them empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Salon {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub location: Location,
    #[serde(flatten)]
    pub contact: Contact,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(rename = "price_range", skip_serializing_if = "Option::is_none")]
    pub price_tier: Option<PriceTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    pub review_count: i32,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<Service>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub amenities: Vec<Amenity>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub operating_hours: Vec<OperatingHours>,
}

impl Salon {
    /// Checks every aggregate invariant and reports all violations together.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming each offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        if self.name.trim().is_empty() {
            errors.push("name", "must not be empty");
        } else if self.name.chars().count() > MAX_NAME_LEN {
            errors.push("name", format!("must be at most {MAX_NAME_LEN} characters"));
        }

        if self.slug.trim().is_empty() {
            errors.push("slug", "must not be empty");
        }

        if let Some(tier) = self.price_tier {
            if !tier.is_valid() {
                errors.push("price_range", format!("must be between 1 and 4, got {}", tier.0));
            }
        }

        if let Some(rating) = self.rating {
            if !(MIN_RATING..=MAX_RATING).contains(&rating) {
                errors.push("rating", format!("must be between 0 and 5, got {rating}"));
            }
        }

        if self.review_count < 0 {
            errors.push("review_count", "must not be negative");
        }

        if let Some(geo) = &self.location.geo {
            if !geo.is_valid() {
                errors.push(
                    "location",
                    format!(
                        "invalid coordinates ({}, {})",
                        geo.latitude, geo.longitude
                    ),
                );
            }
        }

        errors.into_result()
    }

    /// Whether the salon is open at `at`, judged in `at`'s own timezone.
    ///
    /// A salon without any hours on record is reported closed.
    #[must_use]
    pub fn is_open<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> bool {
        self.operating_hours.iter().any(|h| h.is_open_at(at))
    }

    /// Distance from the salon to `point` in kilometres, if the salon has
    /// usable coordinates.
    #[must_use]
    pub fn distance_to(&self, point: &GeoPoint) -> Option<f64> {
        self.location
            .geo
            .filter(GeoPoint::is_valid)
            .map(|geo| geo.distance_to(point))
    }
}

#[cfg(test)]
#[path = "salon_test.rs"]
mod tests;
