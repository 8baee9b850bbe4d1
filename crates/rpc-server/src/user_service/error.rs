//! Error types for the User service.

use rpc_framework::{FrameworkError, RpcError};
use thiserror::Error;

/// Errors that can occur during user operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UserError {
    /// The requested user was not found.
    #[error("User with id {0} not found")]
    NotFound(String),

    /// Another user already holds this email.
    #[error("User with this email already exists")]
    EmailTaken(String),

    /// The repository refused a write, e.g. an id collision.
    #[error("Storage error: {0}")]
    Storage(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for UserError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => UserError::NotFound(id),
            e @ FrameworkError::AlreadyExists(_) => UserError::Storage(e.to_string()),
            e @ (FrameworkError::ActorClosed | FrameworkError::ActorDropped) => {
                UserError::ActorCommunicationError(e.to_string())
            }
        }
    }
}

impl From<UserError> for RpcError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::NotFound(_) => RpcError::not_found(e.to_string()),
            UserError::EmailTaken(_) => RpcError::conflict(e.to_string()),
            UserError::Storage(_) | UserError::ActorCommunicationError(_) => {
                RpcError::internal(e.to_string())
            }
        }
    }
}
