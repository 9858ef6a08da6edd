//! Sentence embedder backed by a BERT-family model (all-MiniLM-L6-v2 layout).
//!
//! Use [`EmbedderConfig::stub`] for tests and offline runs without model files.

use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use super::Embedder;
use super::bert::SentenceBert;
use super::config::EmbedderConfig;
use super::device::select_device;
use super::error::EmbeddingError;
use super::stub::{normalize, stub_embedding};
use super::utils::load_tokenizer;

enum EmbedderBackend {
    Model {
        model: SentenceBert,
        tokenizer: Box<Tokenizer>,
        device: Device,
    },
    Stub,
}

/// Text → unit-length sentence vector.
pub struct SentenceEmbedder {
    backend: EmbedderBackend,
    config: EmbedderConfig,
}

impl std::fmt::Debug for SentenceEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceEmbedder")
            .field(
                "backend",
                &match &self.backend {
                    EmbedderBackend::Model { device, .. } => format!("Model({:?})", device),
                    EmbedderBackend::Stub => "Stub".to_string(),
                },
            )
            .field("embedding_dim", &self.config.embedding_dim)
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl SentenceEmbedder {
    pub fn load(config: EmbedderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if config.testing_stub {
            warn!("Sentence embedder running in STUB mode; scores are lexical, not semantic");
            return Ok(Self {
                backend: EmbedderBackend::Stub,
                config,
            });
        }

        let device = select_device(config.use_gpu);
        debug!(?device, "Selected compute device for sentence embedder");

        let model = SentenceBert::load(&config.model_dir, &device).map_err(|e| {
            EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load BERT model: {}", e),
            }
        })?;

        if model.hidden_size() != config.embedding_dim {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!(
                    "embedding_dim ({}) does not match model hidden_size ({})",
                    config.embedding_dim,
                    model.hidden_size()
                ),
            });
        }

        let tokenizer = load_tokenizer(&config.model_dir, config.max_seq_len).map_err(|e| {
            EmbeddingError::TokenizationFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            }
        })?;

        info!(
            model_dir = %config.model_dir.display(),
            embedding_dim = config.embedding_dim,
            max_seq_len = config.max_seq_len,
            "Sentence embedder loaded"
        );

        Ok(Self {
            backend: EmbedderBackend::Model {
                model,
                tokenizer: Box::new(tokenizer),
                device,
            },
            config,
        })
    }

    pub fn stub() -> Result<Self, EmbeddingError> {
        Self::load(EmbedderConfig::stub())
    }

    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EmbedderBackend::Stub)
    }

    pub fn config(&self) -> &EmbedderConfig {
        &self.config
    }

    fn embed_with_model(
        &self,
        text: &str,
        model: &SentenceBert,
        tokenizer: &Tokenizer,
        device: &Device,
    ) -> Result<Vec<f32>, EmbeddingError> {
        let encoding =
            tokenizer
                .encode(text, true)
                .map_err(|e| EmbeddingError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        if encoding.get_ids().is_empty() {
            return Ok(vec![0.0; self.config.embedding_dim]);
        }

        debug!(
            text_len = text.len(),
            token_count = encoding.get_ids().len(),
            "Generating sentence embedding"
        );

        let input_ids = Tensor::new(encoding.get_ids(), device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(encoding.get_type_ids(), device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), device)?.unsqueeze(0)?;

        let mut embedding = model
            .encode(&input_ids, &type_ids, &attention_mask)?
            .squeeze(0)?
            .to_vec1::<f32>()?;

        normalize(&mut embedding);
        Ok(embedding)
    }
}

impl Embedder for SentenceEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match &self.backend {
            EmbedderBackend::Model {
                model,
                tokenizer,
                device,
            } => self.embed_with_model(text, model, tokenizer, device),
            EmbedderBackend::Stub => {
                debug!(text_len = text.len(), "Generating stub embedding");
                Ok(stub_embedding(text, self.config.embedding_dim))
            }
        }
    }

    fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }
}
