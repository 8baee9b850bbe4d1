//! # Procedure Routers
//!
//! Declares every procedure this application serves. User procedures sit at the
//! root (`getUsers`, `createUser`, …); todo procedures are mounted under the `todo`
//! alias (`todo.getAllTodos`, …).

pub mod todo_router;
pub mod user_router;

pub use todo_router::todo_router;
pub use user_router::user_router;

use crate::todo_service::TodoService;
use crate::user_service::UserService;
use rpc_framework::{ProcedureRegistry, Router, RouterError};
use serde::Deserialize;

/// `{ id }` input shared by lookups and deletes.
#[derive(Debug, Deserialize)]
pub(crate) struct ByIdInput<Id> {
    pub id: Id,
}

/// `{ id, data }` input shared by partial updates.
#[derive(Debug, Deserialize)]
pub(crate) struct UpdateInput<Id, Patch> {
    pub id: Id,
    pub data: Patch,
}

/// The complete procedure tree.
pub fn app_router(users: UserService, todos: TodoService) -> Router {
    Router::new()
        .merge(user_router(users))
        .merge(todo_router(todos))
}

/// Builds the immutable registry served by the transport.
pub fn build_registry(users: UserService, todos: TodoService) -> Result<ProcedureRegistry, RouterError> {
    app_router(users, todos).build()
}
