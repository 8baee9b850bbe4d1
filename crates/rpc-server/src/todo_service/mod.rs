//! # Todo Service
//!
//! CRUD over todos. Todos carry no uniqueness rule beyond their id, so only
//! `create` needs a transaction (id assignment plus insert).

pub mod error;

pub use error::*;

use crate::model::{Todo, TodoCreate, TodoId, TodoPatch};
use async_trait::async_trait;
use rpc_framework::{ActorClient, ActorEntity, FrameworkError, ResourceActor, ResourceClient};
use tracing::{debug, instrument};

/// Creates a new Todo actor and the service in front of it.
pub fn new() -> (ResourceActor<Todo>, TodoService) {
    let (actor, client) = ResourceActor::new(32);
    (actor, TodoService::new(client))
}

#[derive(Clone)]
pub struct TodoService {
    inner: ResourceClient<Todo>,
}

impl TodoService {
    pub fn new(inner: ResourceClient<Todo>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Todo> for TodoService {
    type Error = TodoError;

    fn inner(&self) -> &ResourceClient<Todo> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        e.into()
    }
}

impl TodoService {
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: TodoId) -> Result<Todo, TodoError> {
        debug!("Sending request");
        self.inner
            .get(id.clone())
            .await?
            .ok_or_else(|| TodoError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn create(&self, params: TodoCreate) -> Result<Todo, TodoError> {
        debug!("Sending request");
        let todo = self
            .inner
            .transaction(move |repo| {
                let id = repo.next_id();
                repo.insert(Todo::from_create(id, params))
            })
            .await??;
        Ok(todo)
    }

    /// Merges the supplied fields; an empty patch returns the todo unchanged.
    #[instrument(skip(self))]
    pub async fn update(&self, id: TodoId, patch: TodoPatch) -> Result<Todo, TodoError> {
        debug!("Sending request");
        Ok(self.inner.update(id, patch).await?)
    }
}
