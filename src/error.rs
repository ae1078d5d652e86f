use thiserror::Error;

#[derive(Error, Debug)]
pub enum SilverLinkError {
    #[error("Invalid catalog entry '{name}': {details}")]
    CatalogInvalid { name: String, details: String },

    #[error("Duplicate benefit name in catalog: {0}")]
    CatalogDuplicate(String),

    #[error("Model response is not valid JSON after fence stripping")]
    MalformedResponse {
        /// The untouched response text, preserved for fallback display.
        raw: String,
    },

    #[error("API key rejected: {0}")]
    ApiKeyRejected(String),

    #[error("API quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("Inference request failed: {0}")]
    InferenceFailed(String),

    #[error("Unsupported audio input: {0}")]
    UnsupportedAudio(String),

    #[error("Speech synthesis failed: {0}")]
    SpeechSynthesisFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SilverLinkError>;
