use thiserror::Error;

#[derive(Error, Debug)]
pub enum LecternError {
    #[error("book {0} not found")]
    BookNotFound(String),

    #[error("embeddings for book {0} not found; generation may be in flight, retry shortly")]
    EmbeddingsNotReady(String),

    #[error("chunk size must be at least 1 character")]
    InvalidChunkSize,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("cache IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache entry could not be encoded or decoded: {0}")]
    Json(#[from] serde_json::Error),

    #[error("content fetch failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Model(#[from] model_client::ModelError),

    #[error("config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl LecternError {
    /// Whether the caller should retry the same request later.
    ///
    /// `EmbeddingsNotReady` means a background generation run may be in
    /// flight or was just scheduled; upstream rate limits and overloads
    /// clear on their own.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::EmbeddingsNotReady(_) => true,
            Self::Model(err) => err.is_retryable(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, LecternError>;
