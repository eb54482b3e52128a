//! Response shapes from the Elasticsearch `_search` endpoint.

use std::collections::HashMap;

use serde::Deserialize;

use crate::document::SalonDocument;

#[derive(Debug, Deserialize)]
pub(crate) struct SearchEnvelope {
    pub hits: SearchHits,
}

/// The `hits` block: total match count plus the page of hits.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHits {
    pub total: TotalHits,
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TotalHits {
    pub value: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_id")]
    pub id: String,
    /// `null` when the request sorted on something other than `_score`
    /// without `track_scores`.
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source")]
    pub source: SalonDocument,
    #[serde(default)]
    pub highlight: Option<HashMap<String, Vec<String>>>,
}

impl SearchHit {
    /// Highlight fragments, `name` first then `description`, then any other
    /// field alphabetically. `None` when the engine returned none.
    #[must_use]
    pub fn fragments(&self) -> Option<Vec<String>> {
        let highlight = self.highlight.as_ref()?;
        let mut fields: Vec<&String> = highlight.keys().collect();
        fields.sort_by(|a, b| (field_rank(a), *a).cmp(&(field_rank(b), *b)));

        let fragments: Vec<String> = fields
            .into_iter()
            .filter_map(|f| highlight.get(f))
            .flatten()
            .cloned()
            .collect();

        (!fragments.is_empty()).then_some(fragments)
    }
}

fn field_rank(field: &str) -> u8 {
    match field {
        "name" => 0,
        "description" => 1,
        _ => 2,
    }
}
