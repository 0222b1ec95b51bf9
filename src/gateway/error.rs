use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use super::payload::Link;
use crate::pipeline::PipelineError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("model failure: {0}")]
    ModelFailed(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<PipelineError> for GatewayError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidRequest { message } => GatewayError::InvalidRequest(message),
            PipelineError::Model(e) => GatewayError::ModelFailed(e.to_string()),
            PipelineError::Internal { reason } => GatewayError::InternalError(reason),
        }
    }
}

impl GatewayError {
    pub(crate) fn caching_disabled() -> Self {
        GatewayError::NotFound(
            "The requested resource does not exist, since caching is disabled.".to_string(),
        )
    }

    pub(crate) fn unknown_cache_item(id: &str) -> Self {
        GatewayError::NotFound(format!(
            "The requested cache item with ID '{}' does not exist.",
            id
        ))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::ModelFailed(_) => StatusCode::BAD_GATEWAY,
            GatewayError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub timestamp: String,
    pub status: u16,
    pub error: String,
    pub message: String,
    #[serde(rename = "_links")]
    pub links: Vec<Link>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "Request failed");
        }

        let body = Json(ErrorResponse {
            timestamp: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.to_string(),
            links: vec![Link::new("base", "/")],
        });

        (status, body).into_response()
    }
}
