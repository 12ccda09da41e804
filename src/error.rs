use thiserror::Error;

/// Errors raised by the knowledge collection
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KnowledgeError {
    #[error("Knowledge item with ID {0} not found")]
    NotFound(u64),
}

/// Errors from the text-generation service
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("API key missing (set AZURE_OPENAI_API_KEY)")]
    MissingApiKey,

    #[error("endpoint not configured (set AZURE_OPENAI_ENDPOINT or `autorag config endpoint <url>`)")]
    MissingEndpoint,

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Errors loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("unknown config key: {0}")]
    UnknownKey(String),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
