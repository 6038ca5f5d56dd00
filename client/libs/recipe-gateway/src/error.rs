//! Error types for gateway operations

use thiserror::Error;

/// Gateway errors
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Transport-level failure talking to the backend
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Expected record was not returned
    #[error("Not found: {0}")]
    NotFound(String),

    /// Credentials rejected or missing
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Failure injected by the in-memory gateway
    #[error("Injected failure: {0}")]
    Injected(String),
}

impl GatewayError {
    /// Map a non-success HTTP status into the matching variant
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => GatewayError::Unauthorized(body),
            404 => GatewayError::NotFound(body),
            _ => GatewayError::Status { status, body },
        }
    }

    /// Message suitable for showing to the user, without the variant prefix
    pub fn description(&self) -> String {
        match self {
            GatewayError::Status { body, .. } => body.clone(),
            GatewayError::NotFound(msg)
            | GatewayError::Unauthorized(msg)
            | GatewayError::Injected(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
