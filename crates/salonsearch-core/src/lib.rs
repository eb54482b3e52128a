//! Domain model, search parameters and configuration shared by every
//! salonsearch crate.

pub mod app_config;
pub mod config;
pub mod error;
pub mod geo;
pub mod hours;
pub mod params;
pub mod ranking;
pub mod response;
pub mod salon;
pub mod service;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, FieldError, ValidationError};
pub use geo::GeoPoint;
pub use hours::OperatingHours;
pub use params::{SearchParameters, SearchRequest, SortBy};
pub use ranking::relevance_score;
pub use response::{Backend, SearchResponse, SearchResult};
pub use salon::{Amenity, Category, Contact, Location, PriceTier, Salon};
pub use service::Service;
