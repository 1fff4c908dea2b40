//! Provider types and errors

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while retrieving a tile.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// Request could not be sent or the body could not be read
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Tile server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// No response within the per-tile timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Response body is not a usable tile image
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// True for failures produced before any response was received.
    pub fn is_network(&self) -> bool {
        matches!(self, ProviderError::HttpError(_) | ProviderError::Timeout(_))
    }
}
