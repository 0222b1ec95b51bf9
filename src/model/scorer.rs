use std::collections::HashSet;

use candle_core::{Device, Tensor};
use tracing::{debug, info};

use super::bert::BertQuestionAnswering;
use super::config::ModelConfig;
use super::device::select_device;
use super::error::ModelError;
use super::{SpanLogits, SpanScorer, TokenizedFragment};

/// Stub logit for a paragraph token that also occurs in the query.
pub const STUB_MATCH_LOGIT: f32 = 5.0;
/// Stub logit for any other paragraph token.
pub const STUB_MISS_LOGIT: f32 = -1.0;
/// Stub logit for query, separator and padding tokens.
pub const STUB_IGNORED_LOGIT: f32 = -10.0;

enum ScorerBackend {
    Model {
        model: BertQuestionAnswering,
        device: Device,
    },
    Stub,
}

/// Extractive QA model producing start/end logits per token.
pub struct QaModel {
    backend: ScorerBackend,
    batch_size: usize,
}

impl std::fmt::Debug for QaModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QaModel")
            .field(
                "backend",
                &match &self.backend {
                    ScorerBackend::Model { device, .. } => format!("Model({:?})", device),
                    ScorerBackend::Stub => "Stub".to_string(),
                },
            )
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl QaModel {
    /// Loads the model from `config.model_path`, or a stub if none is configured.
    pub fn load(config: &ModelConfig) -> Result<Self, ModelError> {
        if config.batch_size == 0 {
            return Err(ModelError::InvalidConfig {
                reason: "batch_size must be greater than 0".to_string(),
            });
        }

        let Some(model_path) = &config.model_path else {
            info!("No model path configured, operating in stub mode");
            return Ok(Self::stub_with_batch_size(config.batch_size));
        };

        if !model_path.exists() {
            return Err(ModelError::ModelNotFound {
                path: model_path.clone(),
            });
        }

        for required in ["config.json", "model.safetensors"] {
            if !model_path.join(required).exists() {
                return Err(ModelError::ModelLoadFailed {
                    reason: format!("Missing {} in {}", required, model_path.display()),
                });
            }
        }

        let device = select_device()?;
        debug!(?device, "Selected compute device for span scoring");

        let model = BertQuestionAnswering::load(model_path, &device).map_err(|e| {
            ModelError::ModelLoadFailed {
                reason: format!("Failed to load QA model: {}", e),
            }
        })?;

        info!(
            model_path = %model_path.display(),
            batch_size = config.batch_size,
            "QA model loaded"
        );

        Ok(Self {
            backend: ScorerBackend::Model { model, device },
            batch_size: config.batch_size,
        })
    }

    /// Lexical-overlap scorer: paragraph tokens that also appear in the query win.
    pub fn stub() -> Self {
        Self::stub_with_batch_size(crate::constants::DEFAULT_BATCH_SIZE)
    }

    fn stub_with_batch_size(batch_size: usize) -> Self {
        Self {
            backend: ScorerBackend::Stub,
            batch_size,
        }
    }

    pub fn is_stub(&self) -> bool {
        matches!(self.backend, ScorerBackend::Stub)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn predict_with_model(
        &self,
        model: &BertQuestionAnswering,
        device: &Device,
        fragments: &[TokenizedFragment],
    ) -> Result<Vec<SpanLogits>, ModelError> {
        let mut logits = Vec::with_capacity(fragments.len());

        for chunk in fragments.chunks(self.batch_size) {
            let seq_len = chunk.iter().map(TokenizedFragment::len).max().unwrap_or(0);
            if seq_len == 0 {
                logits.extend(chunk.iter().map(|_| SpanLogits::default()));
                continue;
            }

            let rows = chunk.len();
            let mut input_ids = Vec::with_capacity(rows * seq_len);
            let mut type_ids = Vec::with_capacity(rows * seq_len);
            let mut attention_mask = Vec::with_capacity(rows * seq_len);
            for fragment in chunk {
                padded_extend(&mut input_ids, &fragment.input_ids, seq_len);
                padded_extend(&mut type_ids, &fragment.type_ids, seq_len);
                padded_extend(&mut attention_mask, &fragment.attention_mask, seq_len);
            }

            let input_ids = Tensor::from_vec(input_ids, (rows, seq_len), device)?;
            let type_ids = Tensor::from_vec(type_ids, (rows, seq_len), device)?;
            let attention_mask = Tensor::from_vec(attention_mask, (rows, seq_len), device)?;

            let (start, end) = model
                .forward(&input_ids, &type_ids, Some(&attention_mask))
                .map_err(|e| ModelError::InferenceFailed {
                    reason: e.to_string(),
                })?;
            let start = start.to_vec2::<f32>()?;
            let end = end.to_vec2::<f32>()?;

            for ((fragment, start), end) in chunk.iter().zip(start).zip(end) {
                let len = fragment.len();
                logits.push(SpanLogits {
                    start: start[..len].to_vec(),
                    end: end[..len].to_vec(),
                });
            }

            debug!(rows, seq_len, "Scored fragment batch");
        }

        Ok(logits)
    }
}

impl SpanScorer for QaModel {
    fn predict(&self, fragments: &[TokenizedFragment]) -> Result<Vec<SpanLogits>, ModelError> {
        if fragments.is_empty() {
            return Ok(Vec::new());
        }

        match &self.backend {
            ScorerBackend::Model { model, device } => {
                self.predict_with_model(model, device, fragments)
            }
            ScorerBackend::Stub => Ok(fragments.iter().map(lexical_logits).collect()),
        }
    }
}

fn padded_extend(out: &mut Vec<u32>, values: &[u32], len: usize) {
    out.extend_from_slice(values);
    out.extend(std::iter::repeat_n(0, len - values.len()));
}

fn normalize_token(token: &str) -> String {
    token
        .trim_start_matches("##")
        .trim_start_matches('\u{120}')
        .to_lowercase()
}

/// Start and end logits from token overlap between query and paragraph.
pub(crate) fn lexical_logits(fragment: &TokenizedFragment) -> SpanLogits {
    let query_terms: HashSet<String> = fragment
        .tokens
        .iter()
        .zip(&fragment.sequence_ids)
        .filter(|(_, sequence)| **sequence == Some(0))
        .map(|(token, _)| normalize_token(token))
        .filter(|token| token.chars().any(char::is_alphanumeric))
        .collect();

    let scores: Vec<f32> = fragment
        .tokens
        .iter()
        .enumerate()
        .map(|(index, token)| {
            if fragment.is_paragraph_token(index) {
                if query_terms.contains(&normalize_token(token)) {
                    STUB_MATCH_LOGIT
                } else {
                    STUB_MISS_LOGIT
                }
            } else if index == fragment.cls_index {
                0.0
            } else {
                STUB_IGNORED_LOGIT
            }
        })
        .collect();

    SpanLogits {
        start: scores.clone(),
        end: scores,
    }
}
