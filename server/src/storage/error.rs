use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("remote request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote backend responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("stored data could not be decoded: {0}")]
    Decode(String),

    #[error("records could not be encoded: {0}")]
    Encode(String),
}
