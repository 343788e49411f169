use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// A required composition input is missing or out of range
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network or stream failure before or during a request
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unauthorized: bearer token missing or rejected")]
    Unauthorized,

    #[error("Backend error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::InvalidResponse(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
