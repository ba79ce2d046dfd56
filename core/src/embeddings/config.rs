//! Configuration for embeddings.

use serde::Deserialize;
use serde::Serialize;

/// Environment variable holding the key for the OpenAI-compatible provider.
pub const OPENAI_KEY_ENV: &str = "OPENAI_EMBEDDING_KEY";

/// Main embeddings configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EmbeddingsConfig {
    /// Which provider embeds corpus entries and queries
    #[serde(default)]
    pub provider: ProviderSelection,

    /// Vector length for the local hashing model
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// OpenAI configuration (if using OpenAI)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai: Option<OpenAIConfig>,

    /// Cache settings
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: ProviderSelection::default(),
            dimensions: default_dimensions(),
            openai: None,
            cache: CacheConfig::default(),
        }
    }
}

/// Provider selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderSelection {
    /// Deterministic local feature-hashing model
    #[default]
    Hashing,
    /// OpenAI-compatible HTTP endpoint
    OpenAI,
}

const fn default_dimensions() -> usize {
    384
}

/// OpenAI embeddings configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OpenAIConfig {
    /// Model to use (e.g., "text-embedding-3-small", "text-embedding-3-large")
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// Optional dimension override (for models that support it)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<usize>,

    /// API endpoint (for custom/proxy endpoints)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            model: default_openai_model(),
            dimensions: None,
            api_endpoint: None,
        }
    }
}

fn default_openai_model() -> String {
    "text-embedding-3-small".to_string()
}

/// Cache configuration for embeddings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum number of cached texts
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: default_cache_capacity(),
        }
    }
}

const fn default_true() -> bool {
    true
}

const fn default_cache_capacity() -> usize {
    1024
}

/// Get the API key for a provider from the environment
pub fn get_embedding_api_key(provider: ProviderSelection) -> Option<String> {
    match provider {
        ProviderSelection::OpenAI => std::env::var(OPENAI_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty()),
        ProviderSelection::Hashing => None,
    }
}
