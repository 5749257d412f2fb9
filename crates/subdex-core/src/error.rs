use thiserror::Error;

/// Result type shared by the transform and index crates.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing file: {path}")]
    MissingFile { path: String },

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Embedding backend unavailable: {0}")]
    Embedding(String),

    #[error("Vector index error: {0}")]
    Index(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Missing-file constructor that keeps callers short.
    pub fn missing(path: impl AsRef<std::path::Path>) -> Self {
        Error::MissingFile { path: path.as_ref().display().to_string() }
    }
}
