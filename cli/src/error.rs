use polyglot_core::RetrievalError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("corpus {0} has no index; run `polyglot build {0}` first")]
    NotIndexed(String),

    #[error("no corpora in {0}; run `polyglot init` to create the sample corpora")]
    EmptyStore(String),

    #[error(transparent)]
    Core(#[from] RetrievalError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
