//! Engine configuration, read from `~/.polyglot/config.toml` or an explicit
//! path. Every field has a default, so an absent file is not an error.

use crate::embeddings::EmbeddingsConfig;
use crate::error::RetrievalError;
use crate::error::Result;
use crate::language::Language;
use polyglot_persistence::CompressionLevel;
use serde::Deserialize;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;

pub const CONFIG_DIR_NAME: &str = ".polyglot";
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PolyglotConfig {
    /// Directory holding corpus JSON files and index artifacts.
    pub corpus_dir: PathBuf,

    /// Language whose text is embedded and matched against queries.
    pub source_language: Language,

    /// Results returned by a search when the caller does not say.
    pub default_k: usize,

    /// Examples included in an assembled context block.
    pub max_examples: usize,

    /// zstd level for index artifacts.
    pub compression: CompressionLevel,

    pub embeddings: EmbeddingsConfig,
}

impl Default for PolyglotConfig {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from("./corpus_data"),
            source_language: Language::English,
            default_k: 5,
            max_examples: 3,
            compression: CompressionLevel::default(),
            embeddings: EmbeddingsConfig::default(),
        }
    }
}

impl PolyglotConfig {
    /// `~/.polyglot/config.toml`, if a home directory can be determined.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from `path`, or from the default location when `path` is `None`.
    ///
    /// A missing default file yields defaults; a missing explicit file is an
    /// error, as is a file that does not parse.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => RetrievalError::Config {
                path: path.to_path_buf(),
                message: "file not found".to_string(),
            },
            _ => RetrievalError::Io(e),
        })?;
        let config = Self::from_toml(&contents).map_err(|message| RetrievalError::Config {
            path: path.to_path_buf(),
            message,
        })?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> std::result::Result<Self, String> {
        let config: Self = toml::from_str(contents).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.embeddings.dimensions == 0 {
            return Err("embeddings.dimensions must be greater than zero".to_string());
        }
        Ok(())
    }
}
