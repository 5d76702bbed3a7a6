use thiserror::Error;

/// Failures that stop an import. Tables that can't be read are skipped, not
/// reported here.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("anchor heading not found: {0}")]
    MissingAnchor(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ImportError>;
