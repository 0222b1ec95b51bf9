use std::path::PathBuf;

use crate::config::ConfigError;
use crate::constants::{DEFAULT_BATCH_SIZE, DEFAULT_DOC_STRIDE, DEFAULT_MAX_LENGTH};

/// Tokenizer and span-scorer settings.
///
/// Without `model_path` the scorer runs in stub mode; without a tokenizer
/// (explicit or inside the model directory) the tokenizer does.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Directory containing `config.json` and `model.safetensors`.
    pub model_path: Option<PathBuf>,
    /// `tokenizer.json` or a directory containing it. Defaults to `model_path`.
    pub tokenizer_path: Option<PathBuf>,
    /// Max tokens per fragment.
    pub max_length: usize,
    /// Tokens shared by consecutive fragments of one paragraph.
    pub doc_stride: usize,
    /// Fragments per forward pass.
    pub batch_size: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            tokenizer_path: None,
            max_length: DEFAULT_MAX_LENGTH,
            doc_stride: DEFAULT_DOC_STRIDE,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl ModelConfig {
    pub const ENV_MODEL_PATH: &'static str = "PROPMATCH_MODEL_PATH";
    pub const ENV_TOKENIZER_PATH: &'static str = "PROPMATCH_TOKENIZER_PATH";
    pub const ENV_MAX_LENGTH: &'static str = "PROPMATCH_MAX_LENGTH";
    pub const ENV_DOC_STRIDE: &'static str = "PROPMATCH_DOC_STRIDE";
    pub const ENV_BATCH_SIZE: &'static str = "PROPMATCH_BATCH_SIZE";

    /// Creates a config for a model directory; the tokenizer is expected next to it.
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: Some(model_path.into()),
            ..Default::default()
        }
    }

    /// Config with no model files: stub tokenizer and stub scorer.
    pub fn stub() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            model_path: path_from_env(Self::ENV_MODEL_PATH),
            tokenizer_path: path_from_env(Self::ENV_TOKENIZER_PATH),
            max_length: usize_from_env(Self::ENV_MAX_LENGTH, defaults.max_length),
            doc_stride: usize_from_env(Self::ENV_DOC_STRIDE, defaults.doc_stride),
            batch_size: usize_from_env(Self::ENV_BATCH_SIZE, defaults.batch_size),
        }
    }

    /// Tokenizer location: the explicit path, else the model directory.
    pub fn resolved_tokenizer_path(&self) -> Option<&PathBuf> {
        self.tokenizer_path.as_ref().or(self.model_path.as_ref())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_length == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_MAX_LENGTH,
                value: self.max_length.to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if self.doc_stride >= self.max_length {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_DOC_STRIDE,
                value: self.doc_stride.to_string(),
                reason: format!("must be smaller than max length {}", self.max_length),
            });
        }

        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_BATCH_SIZE,
                value: self.batch_size.to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if let Some(path) = &self.model_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        if let Some(path) = &self.tokenizer_path
            && !path.exists()
        {
            return Err(ConfigError::PathNotFound { path: path.clone() });
        }

        Ok(())
    }
}

fn path_from_env(var_name: &str) -> Option<PathBuf> {
    std::env::var(var_name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn usize_from_env(var_name: &str, default: usize) -> usize {
    std::env::var(var_name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
