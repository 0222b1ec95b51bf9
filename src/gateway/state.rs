use std::sync::Arc;

use crate::cache::ResultCache;
use crate::model::{SampleTokenizer, SpanScorer};
use crate::pipeline::{Pipeline, ProcessOptions};

/// Shared state of all handlers.
pub struct HandlerState<T, M> {
    pub pipeline: Arc<Pipeline<T, M>>,

    /// Options used where a request leaves them unset.
    pub defaults: ProcessOptions,

    /// Reported by `GET /`.
    pub model_id: String,
}

impl<T, M> Clone for HandlerState<T, M> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            defaults: self.defaults,
            model_id: self.model_id.clone(),
        }
    }
}

impl<T: SampleTokenizer, M: SpanScorer> HandlerState<T, M> {
    pub fn new(pipeline: Pipeline<T, M>, defaults: ProcessOptions, model_id: String) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            defaults,
            model_id,
        }
    }

    pub fn cache(&self) -> Option<&Arc<ResultCache>> {
        self.pipeline.cache()
    }
}
