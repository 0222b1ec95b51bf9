//! Tokenizer and span scorer consumed by the pipeline.
//!
//! The pipeline only sees the [`SampleTokenizer`] and [`SpanScorer`] traits.
//! [`QaTokenizer`] and [`QaModel`] are the production implementations; both
//! fall back to a deterministic stub when no model files are configured.

/// BERT/RoBERTa extractive QA head.
pub mod bert;
/// Tokenizer/scorer configuration.
pub mod config;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
/// Test doubles for [`SpanScorer`].
#[cfg(any(test, feature = "mock"))]
pub mod mock;
/// Span scorer.
pub mod scorer;
/// Fragmenting tokenizer.
pub mod tokenizer;
/// Tokenizer loading helpers.
pub mod utils;

#[cfg(test)]
mod tests;

pub use config::ModelConfig;
pub use error::ModelError;
pub use scorer::QaModel;
pub use tokenizer::QaTokenizer;

use crate::constants::PARAGRAPH_SEQUENCE_ID;

/// One (query, schema value) pair sent to the tokenizer.
#[derive(Debug, Clone, PartialEq)]
pub struct QaSample {
    pub query: String,
    pub paragraph: String,
    /// Keep the decoded fragment and its tokens.
    pub verbose: bool,
}

impl QaSample {
    pub fn new(query: impl Into<String>, paragraph: impl Into<String>, verbose: bool) -> Self {
        Self {
            query: query.into(),
            paragraph: paragraph.into(),
            verbose,
        }
    }
}

/// One model input window. A long paragraph yields several overlapping fragments
/// of the same sample.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TokenizedFragment {
    pub input_ids: Vec<u32>,
    pub attention_mask: Vec<u32>,
    pub type_ids: Vec<u32>,
    /// Char range in the paragraph per token; `None` outside the paragraph.
    pub offset_map: Vec<Option<(usize, usize)>>,
    /// `Some(0)` query, `Some(1)` paragraph, `None` special/padding.
    pub sequence_ids: Vec<Option<usize>>,
    /// Position of the classification token.
    pub cls_index: usize,
    /// Index of the originating [`QaSample`] in the tokenized batch.
    pub sample_index: usize,
    /// Token strings of the whole window.
    pub tokens: Vec<String>,
    /// Decoded paragraph part (verbose samples only).
    pub fragment: Option<String>,
    /// Paragraph tokens (verbose samples only).
    pub fragment_tokens: Option<Vec<String>>,
}

impl TokenizedFragment {
    #[inline]
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }

    /// Returns `true` if token `index` belongs to the paragraph.
    #[inline]
    pub fn is_paragraph_token(&self, index: usize) -> bool {
        self.sequence_ids.get(index).copied().flatten() == Some(PARAGRAPH_SEQUENCE_ID)
    }
}

/// Per-token start and end logits of one fragment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpanLogits {
    pub start: Vec<f32>,
    pub end: Vec<f32>,
}

/// Splits (query, paragraph) samples into model input fragments.
pub trait SampleTokenizer: Send + Sync {
    fn tokenize(&self, samples: &[QaSample]) -> Result<Vec<TokenizedFragment>, ModelError>;
}

/// Produces start/end logits for tokenized fragments, in input order.
pub trait SpanScorer: Send + Sync {
    fn predict(&self, fragments: &[TokenizedFragment]) -> Result<Vec<SpanLogits>, ModelError>;
}
