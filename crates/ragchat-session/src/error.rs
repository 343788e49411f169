use ragchat_client::ClientError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Only one response may stream per session
    #[error("A response is already streaming")]
    AlreadyStreaming,

    #[error("Cannot switch conversations while a response is streaming")]
    SwitchWhileStreaming,

    #[error("Conversation history is still loading")]
    HistoryLoading,

    /// The send was stopped before its stream opened
    #[error("Send was cancelled")]
    Cancelled,

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl SessionError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Client(e) if e.is_configuration())
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
