use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, info, instrument};

use crate::gateway::error::GatewayError;
use crate::gateway::payload::{
    CacheSettingsBody, CachedItem, CachedItemBody, CachedItemsBody, Link, PredictBody,
    PredictParams, RootBody, cache_item_href,
};
use crate::gateway::state::HandlerState;
use crate::model::{SampleTokenizer, SpanScorer};
use crate::pipeline::{NoAnswerStrategy, PredictionRequest, ProcessOptions};

const DUPLICATES_SUPPRESS: &str = "suppress";

/// Merges query-string overrides into the configured defaults.
pub(crate) fn resolve_options(
    params: &PredictParams,
    defaults: ProcessOptions,
) -> Result<ProcessOptions, GatewayError> {
    let mut options = defaults;

    if let Some(top) = params.top.as_deref() {
        let top = top.trim().parse::<usize>().map_err(|_| {
            GatewayError::InvalidRequest(
                "Invalid value for query parameter 'top'. A non-negative integer is expected."
                    .to_string(),
            )
        })?;
        options = options.with_top(Some(top));
    }

    if let Some(duplicates) = params.duplicates.as_deref() {
        options = options.with_suppress_duplicates(duplicates.trim() == DUPLICATES_SUPPRESS);
    }

    if let Some(strategy) = params.no_answer_strategy.as_deref() {
        let strategy = strategy.parse::<NoAnswerStrategy>().map_err(|_| {
            GatewayError::InvalidRequest(
                "Invalid value for query parameter 'no-answer-strategy'. Allowed values are 'ignore' and 'threshold'."
                    .to_string(),
            )
        })?;
        options = options.with_no_answer_strategy(strategy);
    }

    Ok(options)
}

#[instrument(skip(state, request))]
pub async fn predict_handler<T, M>(
    State(state): State<HandlerState<T, M>>,
    Query(params): Query<PredictParams>,
    Json(request): Json<serde_json::Value>,
) -> Result<Response, GatewayError>
where
    T: SampleTokenizer + 'static,
    M: SpanScorer + 'static,
{
    let options = resolve_options(&params, state.defaults)?;
    let request = PredictionRequest::from_value(request)?;

    let pipeline = state.pipeline.clone();
    let response = tokio::task::spawn_blocking(move || pipeline.process(request, &options))
        .await
        .map_err(|e| GatewayError::InternalError(format!("prediction task failed: {}", e)))??;

    info!(
        schemas = response.schemas.len(),
        cached = response.results().filter(|r| r.is_cached).count(),
        "Prediction complete"
    );

    Ok(Json(PredictBody {
        prediction: response,
        links: vec![Link::new("self", "/predict"), Link::new("base", "/")],
    })
    .into_response())
}

#[instrument(skip(state))]
pub async fn root_handler<T, M>(State(state): State<HandlerState<T, M>>) -> Response
where
    T: SampleTokenizer + 'static,
    M: SpanScorer + 'static,
{
    Json(RootBody {
        model: state.model_id.clone(),
        links: vec![
            Link::new("self", "/"),
            Link::new("prediction", "/predict"),
            Link::new("cache", "/cache"),
        ],
    })
    .into_response()
}

#[instrument(skip(state))]
pub async fn cache_settings_handler<T, M>(State(state): State<HandlerState<T, M>>) -> Response
where
    T: SampleTokenizer + 'static,
    M: SpanScorer + 'static,
{
    let mut links = vec![Link::new("self", "/cache"), Link::new("base", "/")];
    let body = match state.cache() {
        Some(cache) => {
            links.push(Link::new("items", "/cache/items"));
            CacheSettingsBody {
                is_enabled: true,
                cache_size: Some(cache.capacity()),
                cached_items: Some(cache.len()),
                links,
            }
        }
        None => CacheSettingsBody {
            is_enabled: false,
            cache_size: None,
            cached_items: None,
            links,
        },
    };
    Json(body).into_response()
}

#[instrument(skip(state))]
pub async fn list_cache_items_handler<T, M>(
    State(state): State<HandlerState<T, M>>,
) -> Result<Response, GatewayError>
where
    T: SampleTokenizer + 'static,
    M: SpanScorer + 'static,
{
    let cache = state.cache().ok_or_else(GatewayError::caching_disabled)?;
    let cached_items = cache
        .list_entries()
        .into_iter()
        .map(|summary| {
            let links = vec![Link::new("self", cache_item_href(&summary.id))];
            CachedItem { summary, links }
        })
        .collect();

    Ok(Json(CachedItemsBody {
        cached_items,
        links: vec![Link::new("self", "/cache/items"), Link::new("cache", "/cache")],
    })
    .into_response())
}

#[instrument(skip(state))]
pub async fn get_cache_item_handler<T, M>(
    State(state): State<HandlerState<T, M>>,
    Path(id): Path<String>,
) -> Result<Response, GatewayError>
where
    T: SampleTokenizer + 'static,
    M: SpanScorer + 'static,
{
    let cache = state.cache().ok_or_else(GatewayError::caching_disabled)?;
    let detail = cache
        .get_entry_by_id(&id)
        .ok_or_else(|| GatewayError::unknown_cache_item(&id))?;

    Ok(Json(CachedItemBody {
        links: vec![
            Link::new("self", cache_item_href(&id)),
            Link::new("items", "/cache/items"),
        ],
        detail,
    })
    .into_response())
}

#[instrument(skip(state))]
pub async fn evict_cache_item_handler<T, M>(
    State(state): State<HandlerState<T, M>>,
    Path(id): Path<String>,
) -> Result<Response, GatewayError>
where
    T: SampleTokenizer + 'static,
    M: SpanScorer + 'static,
{
    let cache = state.cache().ok_or_else(GatewayError::caching_disabled)?;
    if !cache.evict_by_id(&id) {
        return Err(GatewayError::unknown_cache_item(&id));
    }
    debug!(id = %id, "Evicted cache item");
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[instrument(skip(state))]
pub async fn evict_all_handler<T, M>(
    State(state): State<HandlerState<T, M>>,
) -> Result<Response, GatewayError>
where
    T: SampleTokenizer + 'static,
    M: SpanScorer + 'static,
{
    let cache = state.cache().ok_or_else(GatewayError::caching_disabled)?;
    let evicted = cache.len();
    cache.evict_all();
    info!(evicted, "Cleared cache");
    Ok(StatusCode::NO_CONTENT.into_response())
}
