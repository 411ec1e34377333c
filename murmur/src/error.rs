//! Failure modes surfaced by the store, the streaming session and the
//! client seam.

use std::error::Error;

use thiserror::Error;
use tokio::task::JoinError;
use tonic::Status;

/// Convenience result type.
pub type ChatResult<T> = Result<T, ChatError>;

/// A message rejected at the store's append boundary. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInput {
    #[error("sender must not be empty")]
    EmptySender,
    #[error("text must not be empty")]
    EmptyText,
    #[error("text is {len} bytes long, the limit is {limit}")]
    TextTooLong { len: usize, limit: usize },
    #[error("{field} contains a non printable-ascii character at byte {position}")]
    NonAscii { field: &'static str, position: usize },
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),
    #[error("persistence error: {0}")]
    Persistence(#[source] Box<dyn Error + Send + Sync>),
    #[error("transport error: {0}")]
    Transport(#[from] Status),
    #[error("connection error: {0}")]
    Connect(#[from] tonic::transport::Error),
    #[error("append task failed: {0}")]
    Task(#[from] JoinError),
}

impl ChatError {
    pub(crate) fn persistence<E: Error + Send + Sync + 'static>(error: E) -> Self {
        Self::Persistence(Box::new(error))
    }

    /// Whether the caller must fix its request rather than retry it.
    pub fn is_invalid_input(&self) -> bool {
        match self {
            Self::InvalidInput(_) => true,
            Self::Transport(status) => status.code() == tonic::Code::InvalidArgument,
            _ => false,
        }
    }
}

impl From<ChatError> for Status {
    fn from(error: ChatError) -> Self {
        match error {
            ChatError::InvalidInput(e) => Status::invalid_argument(e.to_string()),
            ChatError::Transport(status) => status,
            ChatError::Connect(e) => Status::unavailable(e.to_string()),
            e => Status::internal(e.to_string()),
        }
    }
}
