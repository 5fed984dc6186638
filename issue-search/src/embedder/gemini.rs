//! Gemini embedder implementation using the genai crate.

use async_trait::async_trait;
use genai::embed::EmbedOptions;
use tokio_util::sync::CancellationToken;

use crate::traits::{Embedder, EmbeddingKind, Result, SearchError};

/// Gemini embedding model configuration.
pub const GEMINI_MODEL: &str = "gemini-embedding-001";
pub const GEMINI_DIMENSIONS: usize = 1536;

/// Embedder implementation using Google's Gemini API via the `genai`
/// crate.
///
/// The genai client automatically reads `GEMINI_API_KEY` from the
/// environment.
///
/// # Example
///
/// ```ignore
/// let embedder = GeminiEmbedder::new()?;
/// let embedding = embedder.embed("auth timeout", EmbeddingKind::Query, &ct).await?;
/// ```
#[derive(Clone)]
pub struct GeminiEmbedder {
    client: genai::Client,
    model: String,
}

impl GeminiEmbedder {
    /// Create a new Gemini embedder with the default model.
    pub fn new() -> Result<Self> {
        Self::with_model(GEMINI_MODEL)
    }

    /// Create a new Gemini embedder with a specific model.
    pub fn with_model(model: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: genai::Client::default(),
            model: model.into(),
        })
    }

    /// Try to create from environment variable.
    ///
    /// Returns `None` if `GEMINI_API_KEY` is not set, or `Some(Err)` if
    /// the client can't be created for another reason.
    pub fn try_from_env() -> Option<Result<Self>> {
        if std::env::var("GEMINI_API_KEY").is_err() {
            return None;
        }
        Some(Self::new())
    }

    fn options_for(kind: EmbeddingKind) -> EmbedOptions {
        let embedding_type = match kind {
            EmbeddingKind::Query => "RETRIEVAL_QUERY",
            EmbeddingKind::Document => "RETRIEVAL_DOCUMENT",
        };
        EmbedOptions::new().with_embedding_type(embedding_type)
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    async fn embed(
        &self,
        text: &str,
        kind: EmbeddingKind,
        ct: &CancellationToken,
    ) -> Result<Option<Vec<f32>>> {
        if ct.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        if text.trim().is_empty() {
            return Ok(None);
        }

        let options = Self::options_for(kind);
        let response = self
            .client
            .embed(&self.model, text, Some(&options))
            .await
            .map_err(|e| SearchError::Embedding(e.to_string()))?;

        Ok(response
            .first_embedding()
            .map(|embedding| embedding.vector().to_vec()))
    }

    fn dimensions(&self) -> usize {
        GEMINI_DIMENSIONS
    }
}
