use thiserror::Error;

/// Failure to encode or decode a board document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("malformed board document: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("board document must be a JSON object")]
    NotADocument,

    #[error("failed to encode board document: {0}")]
    Encode(#[source] serde_json::Error),
}
