//! OpenAI-compatible embeddings provider
//!
//! Supports:
//! - text-embedding-3-small (256-1536 dimensions)
//! - text-embedding-3-large (256-3072 dimensions)
//! - Batch processing (up to 2048 inputs per request, requests run concurrently)
//! - Uses OPENAI_EMBEDDING_KEY (not OPENAI_API_KEY)

use super::super::EmbeddingError;
use super::super::EmbeddingProvider;
use super::super::EmbeddingVector;
use futures::future::try_join_all;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/embeddings";

/// OpenAI has a limit of 2048 inputs per request
const MAX_BATCH_SIZE: usize = 2048;

/// OpenAI embedding provider
pub struct OpenAIEmbeddings {
    client: Client,
    api_key: String,
    model: String,
    dimensions: Option<usize>,
    api_endpoint: Option<String>,
}

impl OpenAIEmbeddings {
    pub fn new(
        api_key: String,
        model: String,
        dimensions: Option<usize>,
        api_endpoint: Option<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            dimensions,
            api_endpoint,
        }
    }
}

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
    encoding_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    data: Vec<OpenAIEmbedding>,
}

#[derive(Debug, Deserialize)]
struct OpenAIEmbedding {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    error: OpenAIErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorDetail {
    message: String,
    #[serde(rename = "type", default)]
    error_type: String,
}

#[async_trait::async_trait]
impl EmbeddingProvider for OpenAIEmbeddings {
    fn model_id(&self) -> String {
        format!("openai:{}", self.model)
    }

    fn dimensions(&self) -> usize {
        self.dimensions.unwrap_or(match self.model.as_str() {
            "text-embedding-3-large" => 3072,
            _ => 1536,
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        if !self.is_available() {
            return Err(EmbeddingError::ProviderNotAvailable(self.model_id()));
        }

        let chunks = texts.chunks(MAX_BATCH_SIZE);
        debug!(
            "Embedding {} texts with {} in {} request(s)",
            texts.len(),
            self.model_id(),
            chunks.len()
        );

        // try_join_all yields results in input order regardless of completion order
        let batches = try_join_all(chunks.map(|chunk| self.embed_batch_internal(chunk))).await?;
        Ok(batches.into_iter().flatten().collect())
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }
}

impl OpenAIEmbeddings {
    async fn embed_batch_internal(
        &self,
        texts: &[String],
    ) -> Result<Vec<EmbeddingVector>, EmbeddingError> {
        let endpoint = self.api_endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);

        let request = OpenAIRequest {
            model: &self.model,
            input: texts,
            dimensions: self.dimensions,
            encoding_format: "float",
        };

        let response = self
            .client
            .post(endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| EmbeddingError::ApiError(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if let Ok(error) = serde_json::from_str::<OpenAIError>(&error_text) {
                return Err(EmbeddingError::ApiError(format!(
                    "OpenAI API error ({status}): {} - {}",
                    error.error.error_type, error.error.message
                )));
            }

            return Err(EmbeddingError::ApiError(format!(
                "OpenAI API error ({status}): {error_text}"
            )));
        }

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::ApiError(format!("Failed to parse response: {e}")))?;

        if openai_response.data.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                actual: openai_response.data.len(),
            });
        }

        let mut embeddings = openai_response.data;
        embeddings.sort_by_key(|e| e.index);

        let expected_dims = self.dimensions();
        for embedding in &embeddings {
            if embedding.embedding.len() != expected_dims {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: expected_dims,
                    actual: embedding.embedding.len(),
                });
            }
        }

        Ok(embeddings.into_iter().map(|e| e.embedding).collect())
    }
}
