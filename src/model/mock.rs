//! Span scorers for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::error::ModelError;
use super::scorer::QaModel;
use super::{SpanLogits, SpanScorer, TokenizedFragment};

/// Wraps a scorer and counts calls and scored fragments.
#[derive(Debug)]
pub struct CountingScorer<M = QaModel> {
    inner: M,
    calls: AtomicUsize,
    fragments: AtomicUsize,
}

impl CountingScorer<QaModel> {
    /// Counts calls to the stub [`QaModel`].
    pub fn new() -> Self {
        Self::wrap(QaModel::stub())
    }
}

impl Default for CountingScorer<QaModel> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: SpanScorer> CountingScorer<M> {
    pub fn wrap(inner: M) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            fragments: AtomicUsize::new(0),
        }
    }

    /// Number of `predict` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of fragments scored so far.
    pub fn fragments_scored(&self) -> usize {
        self.fragments.load(Ordering::SeqCst)
    }
}

impl<M: SpanScorer> SpanScorer for CountingScorer<M> {
    fn predict(&self, fragments: &[TokenizedFragment]) -> Result<Vec<SpanLogits>, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.fragments.fetch_add(fragments.len(), Ordering::SeqCst);
        self.inner.predict(fragments)
    }
}

/// Returns the same logits for every fragment.
///
/// Positions past the end of the configured vectors get `fill`.
#[derive(Debug, Clone)]
pub struct FixedScorer {
    start: Vec<f32>,
    end: Vec<f32>,
    fill: f32,
}

impl FixedScorer {
    pub fn new(start: Vec<f32>, end: Vec<f32>) -> Self {
        Self {
            start,
            end,
            fill: -10.0,
        }
    }

    pub fn with_fill(mut self, fill: f32) -> Self {
        self.fill = fill;
        self
    }

    fn fit(&self, scores: &[f32], len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| scores.get(i).copied().unwrap_or(self.fill))
            .collect()
    }
}

impl SpanScorer for FixedScorer {
    fn predict(&self, fragments: &[TokenizedFragment]) -> Result<Vec<SpanLogits>, ModelError> {
        Ok(fragments
            .iter()
            .map(|fragment| SpanLogits {
                start: self.fit(&self.start, fragment.len()),
                end: self.fit(&self.end, fragment.len()),
            })
            .collect())
    }
}

/// Always fails with [`ModelError::InferenceFailed`].
#[derive(Debug, Clone, Default)]
pub struct FailingScorer;

impl SpanScorer for FailingScorer {
    fn predict(&self, _fragments: &[TokenizedFragment]) -> Result<Vec<SpanLogits>, ModelError> {
        Err(ModelError::InferenceFailed {
            reason: "scorer unavailable".to_string(),
        })
    }
}
