//! Provider construction from configuration.

use super::EmbeddingError;
use super::EmbeddingProvider;
use super::cache::CachedEmbedder;
use super::config::EmbeddingsConfig;
use super::config::ProviderSelection;
use super::config::OPENAI_KEY_ENV;
use super::config::get_embedding_api_key;
use super::hashing::HashingEmbedder;
use super::providers::OpenAIEmbeddings;
use std::sync::Arc;
use tracing::info;

/// Build the configured provider, wrapped in a cache when enabled.
///
/// The OpenAI provider needs `OPENAI_EMBEDDING_KEY`; without it this returns
/// [`EmbeddingError::ProviderNotAvailable`].
pub fn create_provider(
    config: &EmbeddingsConfig,
) -> Result<Arc<dyn EmbeddingProvider>, EmbeddingError> {
    let provider: Arc<dyn EmbeddingProvider> = match config.provider {
        ProviderSelection::Hashing => Arc::new(HashingEmbedder::new(config.dimensions)?),
        ProviderSelection::OpenAI => {
            let api_key = get_embedding_api_key(ProviderSelection::OpenAI).ok_or_else(|| {
                EmbeddingError::ProviderNotAvailable(format!("openai ({OPENAI_KEY_ENV} is not set)"))
            })?;
            let openai = config.openai.clone().unwrap_or_default();
            Arc::new(OpenAIEmbeddings::new(
                api_key,
                openai.model,
                openai.dimensions,
                openai.api_endpoint,
            ))
        }
    };

    info!(
        "Using embedding provider {} ({} dimensions)",
        provider.model_id(),
        provider.dimensions()
    );

    if config.cache.enabled {
        Ok(Arc::new(CachedEmbedder::new(provider, config.cache.capacity)))
    } else {
        Ok(provider)
    }
}
