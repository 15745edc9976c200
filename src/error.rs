use thiserror::Error;

/// Failure to decode one link candidate. Recovered by dropping the candidate.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("no decoder for link")]
    UnknownScheme,

    #[error("invalid base64 payload")]
    Base64,

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid port: {0}")]
    InvalidPort(String),

    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// The structured document as a whole could not be parsed.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to set proxy: {0}")]
    Proxy(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Failed to send request: {0}")]
    Request(String),

    #[error("HTTP error: {0}")]
    Status(u16),

    #[error("Failed to read response body: {0}")]
    Body(String),

    #[error("Response body exceeds {0} bytes")]
    TooLarge(u64),

    #[error("Failed to create tokio runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Cannot download subscription data: {0}")]
    Fetch(#[from] FetchError),
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
