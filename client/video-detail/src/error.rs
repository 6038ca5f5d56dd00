/// Error types for the video detail client
use recipe_gateway::GatewayError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ClientError {
    /// Message for a toast body
    pub fn description(&self) -> String {
        match self {
            ClientError::Gateway(e) => e.description(),
            ClientError::Config(msg) | ClientError::InvalidInput(msg) => msg.clone(),
        }
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
