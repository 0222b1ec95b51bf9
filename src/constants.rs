//! Cross-cutting, shared constants.
//!
//! Defaults here are the single source of truth for [`crate::config::Config`],
//! [`crate::model::ModelConfig`] and the pipeline.

/// Model identifier reported when `PROPMATCH_MODEL` is not set.
pub const DEFAULT_MODEL_ID: &str = "SebastianKotstein/restberta-qa-parameter-matching";

/// Number of top start/end token positions combined into span candidates.
pub const DEFAULT_N_BEST: usize = 20;

/// Max cached query results. `0` disables the cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Max tokens per fragment (query + paragraph + special tokens).
pub const DEFAULT_MAX_LENGTH: usize = 512;

/// Overlap, in tokens, between consecutive fragments of one paragraph.
pub const DEFAULT_DOC_STRIDE: usize = 128;

/// Fragments per forward pass.
pub const DEFAULT_BATCH_SIZE: usize = 8;

/// Separator between property paths in a schema value.
pub const PROPERTY_SEPARATOR: char = ' ';

/// Sequence id the tokenizer assigns to paragraph (schema) tokens.
pub const PARAGRAPH_SEQUENCE_ID: usize = 1;
