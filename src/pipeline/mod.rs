//! Request orchestration.
//!
//! normalize/validate → partition (cache hit / miss) → tokenize + score misses →
//! extract → merge → cache write-back → post-process.

pub mod error;
pub mod options;
pub mod orchestrator;
pub mod postprocess;
pub mod types;
pub mod validate;


pub use error::PipelineError;
pub use options::{NoAnswerStrategy, ProcessOptions};
pub use orchestrator::Pipeline;
pub use types::{
    PredictionRequest, PredictionResponse, Query, QueryOutcome, QueryPayload, Schema,
    SchemaPayload, SchemaResult,
};
pub use validate::{normalize_schema_value, validate};
