//! Propmatch library crate (used by the server and integration tests).
//!
//! Matches natural-language queries against the properties of an API schema.
//! A schema is flattened into a space-separated list of property paths
//! (`location.zip state units`); an extractive question-answering model
//! scores token spans of that text and each span is resolved back to the
//! property path it covers.
//!
//! # Public API Surface
//!
//! ## Request Processing
//! - [`Pipeline`] - validation, cache partitioning, inference, merge, post-processing
//! - [`PredictionRequest`], [`PredictionResponse`] - wire types
//! - [`ProcessOptions`], [`NoAnswerStrategy`] - per-request ranking options
//!
//! ## Answer Extraction
//! - [`AnswerExtractor`] - n-best span enumeration and aggregation
//! - [`PropertyLocator`] - char span to property path mapping
//!
//! ## Model
//! - [`QaTokenizer`], [`QaModel`] - fragmenting tokenizer and span scorer
//!   (each with a deterministic stub mode)
//! - [`ModelConfig`] - model paths and fragment settings
//!
//! ## Cache
//! - [`ResultCache`] - bounded LRU of query results, keyed by schema, query and strategy
//!
//! ## Test/Mock Support
//! Mock scorers are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod config;
pub mod constants;
pub mod extraction;
pub mod gateway;
pub mod hashing;
pub mod model;
pub mod pipeline;

pub use cache::{CacheEntryDetail, CacheEntrySummary, CacheKey, ResultCache};
pub use config::{Config, ConfigError};
pub use extraction::{
    Answer, AnswerExtractor, NoAnswerStrategy, Property, PropertyLocator, QueryResult,
    SampleResult,
};
pub use hashing::{fingerprint_hex, hash_key_parts, hash_to_u64};
pub use model::{
    ModelConfig, ModelError, QaModel, QaSample, QaTokenizer, SampleTokenizer, SpanLogits,
    SpanScorer, TokenizedFragment,
};
pub use pipeline::{
    Pipeline, PipelineError, PredictionRequest, PredictionResponse, ProcessOptions,
};
