use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The underlying byte stream failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// A single frame could not be decoded; never fatal to the stream
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),
}

pub type Result<T> = std::result::Result<T, StreamError>;
