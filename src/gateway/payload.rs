use serde::{Deserialize, Serialize};

use crate::cache::{CacheEntryDetail, CacheEntrySummary};
use crate::pipeline::PredictionResponse;

/// Hypermedia link attached to response bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

impl Link {
    pub fn new(rel: &str, href: impl Into<String>) -> Self {
        Self {
            rel: rel.to_string(),
            href: href.into(),
        }
    }
}

pub(crate) fn cache_item_href(id: &str) -> String {
    format!("/cache/items/{}", id)
}

/// Query-string options of `POST /predict`.
#[derive(Debug, Default, Deserialize)]
pub struct PredictParams {
    pub top: Option<String>,
    /// `suppress` removes duplicate properties.
    pub duplicates: Option<String>,
    #[serde(rename = "no-answer-strategy")]
    pub no_answer_strategy: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PredictBody {
    #[serde(flatten)]
    pub prediction: PredictionResponse,
    #[serde(rename = "_links")]
    pub links: Vec<Link>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RootBody {
    pub model: String,
    #[serde(rename = "_links")]
    pub links: Vec<Link>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSettingsBody {
    pub is_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_items: Option<usize>,
    #[serde(rename = "_links")]
    pub links: Vec<Link>,
}

#[derive(Debug, Serialize)]
pub struct CachedItem {
    #[serde(flatten)]
    pub summary: CacheEntrySummary,
    #[serde(rename = "_links")]
    pub links: Vec<Link>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedItemsBody {
    pub cached_items: Vec<CachedItem>,
    #[serde(rename = "_links")]
    pub links: Vec<Link>,
}

#[derive(Debug, Serialize)]
pub struct CachedItemBody {
    #[serde(flatten)]
    pub detail: CacheEntryDetail,
    #[serde(rename = "_links")]
    pub links: Vec<Link>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
