//! Client-side error type.

use pdv_core::{CoreError, ValidationError};
use thiserror::Error;

/// Errors surfaced to a frontend session.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure (connection refused, timeout, undecodable body).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned {status}: {message}")]
    Status {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Input rejected before any request was made.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Cart error: {0}")]
    Cart(#[from] CoreError),

    /// Finalize was called while another finalize is still writing.
    #[error("A sale is already being finalized")]
    FinalizeInFlight,
}

impl ClientError {
    /// True when the API reported 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Status { status: 404, .. })
    }

    /// The HTTP status, when the API answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
