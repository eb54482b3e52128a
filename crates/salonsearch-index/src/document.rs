//! The shape a salon takes inside the search index.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use salonsearch_core::{Contact, GeoPoint, Location, PriceTier, Salon, Service};
use serde::{Deserialize, Serialize};

/// Elasticsearch `geo_point` in object form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lon: f64,
}

impl From<GeoPoint> for GeoLocation {
    fn from(p: GeoPoint) -> Self {
        Self {
            lat: p.latitude,
            lon: p.longitude,
        }
    }
}

impl From<GeoLocation> for GeoPoint {
    fn from(l: GeoLocation) -> Self {
        GeoPoint::new(l.lat, l.lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_max: Option<f64>,
}

impl From<&Service> for ServiceDocument {
    fn from(s: &Service) -> Self {
        Self {
            name: s.name.clone(),
            price_min: s.price_min.and_then(|d| d.to_f64()),
            price_max: s.price_max.and_then(|d| d.to_f64()),
        }
    }
}

/// A salon flattened for indexing.
///
/// Absent values are omitted, never written as `null`. `location` is only
/// present when the salon has valid coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalonDocument {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<i16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: i32,
    pub is_active: bool,
    #[serde(default)]
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ServiceDocument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub amenities: Vec<String>,
}

impl From<&Salon> for SalonDocument {
    fn from(s: &Salon) -> Self {
        Self {
            id: s.id,
            name: s.name.clone(),
            slug: s.slug.clone(),
            description: s.description.clone(),
            address: s.location.address.clone(),
            city: s.location.city.clone(),
            state: s.location.state.clone(),
            postal_code: s.location.postal_code.clone(),
            country: s.location.country.clone(),
            location: s
                .location
                .geo
                .filter(GeoPoint::is_valid)
                .map(GeoLocation::from),
            phone: s.contact.phone.clone(),
            email: s.contact.email.clone(),
            website: s.contact.website.clone(),
            category_id: s.category_id,
            category_name: s.category_name.clone(),
            price_range: s.price_tier.map(|t| t.0),
            rating: s.rating,
            review_count: s.review_count,
            is_active: s.is_active,
            is_verified: s.is_verified,
            created_at: s.created_at,
            updated_at: s.updated_at,
            services: s.services.iter().map(ServiceDocument::from).collect(),
            amenities: s.amenities.iter().map(|a| a.name.clone()).collect(),
        }
    }
}

impl SalonDocument {
    /// Rebuild the searchable part of a salon from an index hit.
    ///
    /// Services and amenities stay empty, as they do for relational search
    /// results; the detail lookup is the place to load them.
    #[must_use]
    pub fn into_salon(self) -> Salon {
        Salon {
            id: self.id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            location: Location {
                address: self.address,
                city: self.city,
                state: self.state,
                postal_code: self.postal_code,
                country: self.country,
                geo: self.location.map(GeoPoint::from),
            },
            contact: Contact {
                phone: self.phone,
                email: self.email,
                website: self.website,
            },
            category_id: self.category_id,
            category_name: self.category_name,
            price_tier: self.price_range.map(PriceTier),
            rating: self.rating,
            review_count: self.review_count,
            is_active: self.is_active,
            is_verified: self.is_verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
            services: Vec::new(),
            amenities: Vec::new(),
            operating_hours: Vec::new(),
        }
    }
}
