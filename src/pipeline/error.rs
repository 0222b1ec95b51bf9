use thiserror::Error;

use crate::model::ModelError;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed or incomplete request; the message names the offending JSON path.
    #[error("{message}")]
    InvalidRequest { message: String },

    #[error("model failure: {0}")]
    Model(#[from] ModelError),

    /// Partition and merge disagreed about a query.
    #[error("internal pipeline error: {reason}")]
    Internal { reason: String },
}

impl PipelineError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        PipelineError::InvalidRequest {
            message: message.into(),
        }
    }
}
