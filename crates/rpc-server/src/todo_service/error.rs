//! Error types for the Todo service.

use rpc_framework::{FrameworkError, RpcError};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TodoError {
    #[error("Todo with id {0} not found")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for TodoError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => TodoError::NotFound(id),
            e @ FrameworkError::AlreadyExists(_) => TodoError::Storage(e.to_string()),
            e @ (FrameworkError::ActorClosed | FrameworkError::ActorDropped) => {
                TodoError::ActorCommunicationError(e.to_string())
            }
        }
    }
}

impl From<TodoError> for RpcError {
    fn from(e: TodoError) -> Self {
        match e {
            TodoError::NotFound(_) => RpcError::not_found(e.to_string()),
            TodoError::Storage(_) | TodoError::ActorCommunicationError(_) => {
                RpcError::internal(e.to_string())
            }
        }
    }
}
