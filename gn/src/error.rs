//! GNTP error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to a GNTP server
#[derive(Debug, Error)]
pub enum GntpError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("GNTP server rejected request ({code}): {description}")]
    Rejected { code: u16, description: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl GntpError {
    /// Check if the server answered but refused the request
    pub fn is_rejected(&self) -> bool {
        matches!(self, GntpError::Rejected { .. })
    }

    /// Check if the server could not be reached at all
    pub fn is_unreachable(&self) -> bool {
        matches!(self, GntpError::Io(_) | GntpError::Timeout(_))
    }
}
