use tokenizers::{Encoding, Tokenizer};
use tracing::{debug, info};

use super::config::ModelConfig;
use super::error::ModelError;
use super::utils::load_fragmenting_tokenizer;
use super::{QaSample, SampleTokenizer, TokenizedFragment};
use crate::constants::PARAGRAPH_SEQUENCE_ID;
use crate::hashing::hash_to_u64;

const STUB_CLS_TOKEN: &str = "[CLS]";
const STUB_SEP_TOKEN: &str = "[SEP]";
const STUB_CLS_ID: u32 = 101;
const STUB_SEP_ID: u32 = 102;
const STUB_VOCAB_OFFSET: u32 = 1_000;
const STUB_VOCAB_SIZE: u64 = 30_000;

enum TokenizerBackend {
    Model {
        tokenizer: Box<Tokenizer>,
        cls_id: Option<u32>,
    },
    Stub,
}

/// Tokenizer producing overlapping (query, paragraph) fragments with
/// paragraph-relative char offsets.
pub struct QaTokenizer {
    backend: TokenizerBackend,
    max_length: usize,
    doc_stride: usize,
}

impl std::fmt::Debug for QaTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QaTokenizer")
            .field(
                "backend",
                &match self.backend {
                    TokenizerBackend::Model { .. } => "Model",
                    TokenizerBackend::Stub => "Stub",
                },
            )
            .field("max_length", &self.max_length)
            .field("doc_stride", &self.doc_stride)
            .finish()
    }
}

impl QaTokenizer {
    /// Loads the configured tokenizer, or a stub if none is configured.
    pub fn load(config: &ModelConfig) -> Result<Self, ModelError> {
        let Some(path) = config.resolved_tokenizer_path() else {
            info!("No tokenizer configured, operating in stub mode");
            return Ok(Self::stub(config.max_length, config.doc_stride));
        };

        let tokenizer = load_fragmenting_tokenizer(path, config.max_length, config.doc_stride)
            .map_err(|e| ModelError::TokenizationFailed {
                reason: format!("Failed to load tokenizer from {}: {}", path.display(), e),
            })?;

        let cls_id = tokenizer
            .token_to_id("[CLS]")
            .or_else(|| tokenizer.token_to_id("<s>"));

        info!(
            tokenizer_path = %path.display(),
            max_length = config.max_length,
            doc_stride = config.doc_stride,
            "Tokenizer loaded"
        );

        Ok(Self {
            backend: TokenizerBackend::Model {
                tokenizer: Box::new(tokenizer),
                cls_id,
            },
            max_length: config.max_length,
            doc_stride: config.doc_stride,
        })
    }

    /// Deterministic tokenizer splitting on property-path punctuation.
    pub fn stub(max_length: usize, doc_stride: usize) -> Self {
        Self {
            backend: TokenizerBackend::Stub,
            max_length,
            doc_stride,
        }
    }

    pub fn is_stub(&self) -> bool {
        matches!(self.backend, TokenizerBackend::Stub)
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn doc_stride(&self) -> usize {
        self.doc_stride
    }

    fn tokenize_with_model(
        &self,
        tokenizer: &Tokenizer,
        cls_id: Option<u32>,
        sample: &QaSample,
        sample_index: usize,
        out: &mut Vec<TokenizedFragment>,
    ) -> Result<(), ModelError> {
        let mut encoding = tokenizer
            .encode_char_offsets((sample.query.as_str(), sample.paragraph.as_str()), true)
            .map_err(|e| ModelError::TokenizationFailed {
                reason: e.to_string(),
            })?;
        let overflowing = encoding.take_overflowing();

        for encoding in std::iter::once(encoding).chain(overflowing) {
            out.push(fragment_from_encoding(
                tokenizer,
                &encoding,
                cls_id,
                sample,
                sample_index,
            )?);
        }
        Ok(())
    }

    fn tokenize_stub(
        &self,
        sample: &QaSample,
        sample_index: usize,
        out: &mut Vec<TokenizedFragment>,
    ) {
        let query = segment(&sample.query);
        let paragraph = segment(&sample.paragraph);

        // [CLS] query [SEP] paragraph [SEP], at least one paragraph token per window.
        let budget = self.max_length.saturating_sub(3).max(1);
        let query = &query[..query.len().min(budget.saturating_sub(1))];
        let window = budget.saturating_sub(query.len()).max(1);
        let step = window.saturating_sub(self.doc_stride).max(1);

        let mut start = 0;
        loop {
            let end = (start + window).min(paragraph.len());
            out.push(stub_fragment(
                query,
                &paragraph[start..end],
                sample,
                sample_index,
            ));
            if end >= paragraph.len() {
                break;
            }
            start += step;
        }
    }
}

impl SampleTokenizer for QaTokenizer {
    fn tokenize(&self, samples: &[QaSample]) -> Result<Vec<TokenizedFragment>, ModelError> {
        let mut fragments = Vec::with_capacity(samples.len());

        for (sample_index, sample) in samples.iter().enumerate() {
            match &self.backend {
                TokenizerBackend::Model { tokenizer, cls_id } => self.tokenize_with_model(
                    tokenizer,
                    *cls_id,
                    sample,
                    sample_index,
                    &mut fragments,
                )?,
                TokenizerBackend::Stub => self.tokenize_stub(sample, sample_index, &mut fragments),
            }
        }

        debug!(
            samples = samples.len(),
            fragments = fragments.len(),
            stub = self.is_stub(),
            "Tokenized batch"
        );
        Ok(fragments)
    }
}

fn fragment_from_encoding(
    tokenizer: &Tokenizer,
    encoding: &Encoding,
    cls_id: Option<u32>,
    sample: &QaSample,
    sample_index: usize,
) -> Result<TokenizedFragment, ModelError> {
    let sequence_ids = encoding.get_sequence_ids();
    let input_ids = encoding.get_ids().to_vec();
    let tokens = encoding.get_tokens().to_vec();

    let offset_map = encoding
        .get_offsets()
        .iter()
        .zip(&sequence_ids)
        .map(|(offsets, sequence)| (*sequence == Some(PARAGRAPH_SEQUENCE_ID)).then_some(*offsets))
        .collect();

    let cls_index = cls_id
        .and_then(|id| input_ids.iter().position(|token| *token == id))
        .unwrap_or(0);

    let (fragment, fragment_tokens) = if sample.verbose {
        let in_paragraph = |index: &usize| sequence_ids[*index] == Some(PARAGRAPH_SEQUENCE_ID);
        let paragraph_ids: Vec<u32> = (0..input_ids.len())
            .filter(in_paragraph)
            .map(|i| input_ids[i])
            .collect();
        let paragraph_tokens: Vec<String> = (0..tokens.len())
            .filter(in_paragraph)
            .map(|i| tokens[i].clone())
            .collect();
        let fragment =
            tokenizer
                .decode(&paragraph_ids, true)
                .map_err(|e| ModelError::TokenizationFailed {
                    reason: e.to_string(),
                })?;
        (Some(fragment), Some(paragraph_tokens))
    } else {
        (None, None)
    };

    Ok(TokenizedFragment {
        attention_mask: encoding.get_attention_mask().to_vec(),
        type_ids: encoding.get_type_ids().to_vec(),
        input_ids,
        offset_map,
        sequence_ids,
        cls_index,
        sample_index,
        tokens,
        fragment,
        fragment_tokens,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Piece {
    pub(crate) text: String,
    pub(crate) start: usize,
    pub(crate) end: usize,
}

/// Splits text into alphanumeric runs and single punctuation chars, with char offsets.
pub(crate) fn segment(text: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut current: Option<Piece> = None;

    for (index, c) in text.chars().enumerate() {
        if c.is_alphanumeric() {
            match current.as_mut() {
                Some(piece) => {
                    piece.text.push(c);
                    piece.end = index + 1;
                }
                None => {
                    current = Some(Piece {
                        text: c.to_string(),
                        start: index,
                        end: index + 1,
                    })
                }
            }
            continue;
        }

        if let Some(piece) = current.take() {
            pieces.push(piece);
        }
        if !c.is_whitespace() {
            pieces.push(Piece {
                text: c.to_string(),
                start: index,
                end: index + 1,
            });
        }
    }

    if let Some(piece) = current {
        pieces.push(piece);
    }
    pieces
}

fn stub_token_id(text: &str) -> u32 {
    let hash = hash_to_u64(text.to_lowercase().as_bytes());
    STUB_VOCAB_OFFSET + (hash % STUB_VOCAB_SIZE) as u32
}

fn stub_fragment(
    query: &[Piece],
    paragraph: &[Piece],
    sample: &QaSample,
    sample_index: usize,
) -> TokenizedFragment {
    let capacity = query.len() + paragraph.len() + 3;
    let mut fragment = TokenizedFragment {
        sample_index,
        cls_index: 0,
        ..Default::default()
    };
    fragment.input_ids.reserve(capacity);

    let mut push = |text: &str, id: u32, type_id: u32, sequence: Option<usize>, offsets| {
        fragment.tokens.push(text.to_string());
        fragment.input_ids.push(id);
        fragment.attention_mask.push(1);
        fragment.type_ids.push(type_id);
        fragment.sequence_ids.push(sequence);
        fragment.offset_map.push(offsets);
    };

    push(STUB_CLS_TOKEN, STUB_CLS_ID, 0, None, None);
    for piece in query {
        push(&piece.text, stub_token_id(&piece.text), 0, Some(0), None);
    }
    push(STUB_SEP_TOKEN, STUB_SEP_ID, 0, None, None);
    for piece in paragraph {
        push(
            &piece.text,
            stub_token_id(&piece.text),
            1,
            Some(PARAGRAPH_SEQUENCE_ID),
            Some((piece.start, piece.end)),
        );
    }
    push(STUB_SEP_TOKEN, STUB_SEP_ID, 1, None, None);

    if sample.verbose {
        let text = match (paragraph.first(), paragraph.last()) {
            (Some(first), Some(last)) => sample
                .paragraph
                .chars()
                .skip(first.start)
                .take(last.end - first.start)
                .collect(),
            _ => String::new(),
        };
        fragment.fragment = Some(text);
        fragment.fragment_tokens = Some(paragraph.iter().map(|p| p.text.clone()).collect());
    }

    fragment
}
