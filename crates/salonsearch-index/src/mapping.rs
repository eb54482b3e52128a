//! Index settings and field mapping for the salons index.
//!
//! Must stay in sync with [`crate::document::SalonDocument`].

use serde_json::{json, Value};

/// Analyzer applied to every free-text field.
pub const TEXT_ANALYZER: &str = "spanish_analyzer";

/// Body for `PUT /<index>`.
#[must_use]
pub fn index_definition() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 0,
            "analysis": {
                "analyzer": {
                    TEXT_ANALYZER: {
                        "type": "custom",
                        "tokenizer": "standard",
                        "filter": ["lowercase", "spanish_stemmer", "asciifolding"]
                    }
                },
                "filter": {
                    "spanish_stemmer": {
                        "type": "stemmer",
                        "language": "spanish"
                    }
                }
            }
        },
        "mappings": {
            "properties": {
                "id": { "type": "long" },
                "name": {
                    "type": "text",
                    "analyzer": TEXT_ANALYZER,
                    "fields": { "keyword": { "type": "keyword" } }
                },
                "slug": { "type": "keyword" },
                "description": { "type": "text", "analyzer": TEXT_ANALYZER },
                "address": { "type": "text" },
                "city": { "type": "keyword" },
                "state": { "type": "keyword" },
                "postal_code": { "type": "keyword" },
                "country": { "type": "keyword" },
                "location": { "type": "geo_point" },
                "phone": { "type": "keyword", "index": false },
                "email": { "type": "keyword", "index": false },
                "website": { "type": "keyword", "index": false },
                "category_id": { "type": "long" },
                "category_name": { "type": "keyword" },
                "price_range": { "type": "integer" },
                "rating": { "type": "float" },
                "review_count": { "type": "integer" },
                "is_active": { "type": "boolean" },
                "is_verified": { "type": "boolean" },
                "created_at": { "type": "date" },
                "updated_at": { "type": "date" },
                "services": {
                    "type": "nested",
                    "properties": {
                        "name": { "type": "text", "analyzer": TEXT_ANALYZER },
                        "price_min": { "type": "float" },
                        "price_max": { "type": "float" }
                    }
                },
                "amenities": { "type": "keyword" }
            }
        }
    })
}
