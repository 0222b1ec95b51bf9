use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use crate::extraction::QueryResult;

/// Body of a prediction request as received. Every field is optional here;
/// [`validate`](super::validate::validate) decides what is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    pub schemas: Option<Vec<SchemaPayload>>,
}

impl PredictionRequest {
    /// Parses a JSON body, reporting shape errors as invalid requests.
    pub fn from_value(value: serde_json::Value) -> Result<Self, PipelineError> {
        serde_json::from_value(value).map_err(|e| PipelineError::InvalidRequest {
            message: format!("The request body is malformed: {}", e),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaPayload {
    pub schema_id: Option<String>,
    pub name: Option<String>,
    /// Space-separated property paths.
    pub value: Option<String>,
    pub queries: Option<Vec<QueryPayload>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPayload {
    pub query_id: Option<String>,
    pub name: Option<String>,
    pub value: Option<String>,
    pub verbose_output: Option<bool>,
}

/// A validated schema with a normalized value.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub id: String,
    pub name: String,
    /// Property paths sorted and joined by single spaces.
    pub value: String,
    pub queries: Vec<Query>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub id: String,
    pub name: String,
    pub value: String,
    pub verbose: bool,
}

/// The request structure annotated with one result per query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    pub schemas: Vec<SchemaResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaResult {
    pub schema_id: String,
    pub name: String,
    pub value: String,
    pub queries: Vec<QueryOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOutcome {
    pub query_id: String,
    pub name: String,
    pub value: String,
    pub verbose_output: bool,
    pub result: QueryResult,
}

impl PredictionResponse {
    /// Iterates over every query result in request order.
    pub fn results(&self) -> impl Iterator<Item = &QueryResult> {
        self.schemas
            .iter()
            .flat_map(|schema| schema.queries.iter().map(|query| &query.result))
    }
}
