use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Invalid link URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Now-playing source failed: {0}")]
    Source(String),

    #[error("Bridge error: {0}")]
    Bridge(#[from] bridge_traits::error::BridgeError),
}

pub type Result<T> = std::result::Result<T, MetadataError>;
