//! Remote embedding provider implementations

pub mod openai;

pub use openai::OpenAIEmbeddings;
