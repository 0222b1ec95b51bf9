use uuid::Uuid;

use super::error::PipelineError;
use super::types::{PredictionRequest, Query, Schema};

/// Sorts the whitespace-separated property paths and joins them with single spaces.
pub fn normalize_schema_value(value: &str) -> String {
    let mut paths: Vec<&str> = value.split_whitespace().collect();
    paths.sort_unstable();
    paths.join(" ")
}

/// Normalizes and validates a request in one pass.
///
/// Missing ids become fresh UUIDs, missing names derive from the id and a missing
/// `verboseOutput` means `false`. The first violation rejects the whole request.
pub fn validate(request: PredictionRequest) -> Result<Vec<Schema>, PipelineError> {
    let Some(schemas) = request.schemas else {
        return Err(PipelineError::invalid(
            "The request does not contain a list of schemas, i.e., '$.schemas[*]'",
        ));
    };
    if schemas.is_empty() {
        return Err(PipelineError::invalid(
            "The list of schemas, i.e., '$.schemas[*]', must contain at least one schema item",
        ));
    }

    let mut validated = Vec::with_capacity(schemas.len());
    for (i, schema) in schemas.into_iter().enumerate() {
        let Some(value) = schema.value else {
            return Err(PipelineError::invalid(format!(
                "The schema '$.schemas[{i}]' has no property 'value'"
            )));
        };
        let value = normalize_schema_value(&value);
        if value.is_empty() {
            return Err(PipelineError::invalid(format!(
                "'$.schemas[{i}].value' must not be empty"
            )));
        }

        let id = schema.schema_id.unwrap_or_else(fresh_id);
        let name = schema.name.unwrap_or_else(|| format!("schema {id}"));

        let Some(queries) = schema.queries else {
            return Err(PipelineError::invalid(format!(
                "The schema '$.schemas[{i}]' has no list of queries, i.e., '$.schemas[{i}].queries[*]'"
            )));
        };
        if queries.is_empty() {
            return Err(PipelineError::invalid(format!(
                "'$.schemas[{i}].queries[*]' must contain at least one query item"
            )));
        }

        let mut validated_queries = Vec::with_capacity(queries.len());
        for (j, query) in queries.into_iter().enumerate() {
            let Some(query_value) = query.value else {
                return Err(PipelineError::invalid(format!(
                    "The query '$.schemas[{i}].queries[{j}]' has no property 'value'"
                )));
            };
            if query_value.is_empty() {
                return Err(PipelineError::invalid(format!(
                    "'$.schemas[{i}].queries[{j}].value' must not be empty"
                )));
            }

            let query_id = query.query_id.unwrap_or_else(fresh_id);
            let query_name = query.name.unwrap_or_else(|| format!("query {query_id}"));
            validated_queries.push(Query {
                id: query_id,
                name: query_name,
                value: query_value,
                verbose: query.verbose_output.unwrap_or(false),
            });
        }

        validated.push(Schema {
            id,
            name,
            value,
            queries: validated_queries,
        });
    }

    Ok(validated)
}

fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}
