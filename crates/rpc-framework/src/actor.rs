//! # Generic Actor Server
//!
//! The `ResourceActor` is the single owner of a repository. It runs in its own Tokio
//! task and handles one request at a time, so every read-modify-write against the
//! collection is serialized without a lock.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::message::ResourceRequest;
use crate::repository::{MemoryRepository, Repository};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The generic actor that owns the repository for one resource kind.
///
/// # Usage Pattern
///
/// 1.  **Create**: call [`ResourceActor::new`] to get the actor (server) and its client.
/// 2.  **Run**: spawn [`ResourceActor::run`] on the runtime.
/// 3.  **Use**: clone the client into every service that needs the collection.
///
/// Dropping the last client closes the channel; the loop then drains and exits.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    repository: Box<dyn Repository<T>>,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates an actor backed by a fresh [`MemoryRepository`].
    ///
    /// `buffer_size` is the capacity of the request channel. When it is full, client
    /// calls wait for space.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        Self::with_repository(buffer_size, MemoryRepository::new())
    }

    /// Creates an actor that owns the given repository.
    pub fn with_repository(
        buffer_size: usize,
        repository: impl Repository<T> + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            repository: Box::new(repository),
        };
        (actor, ResourceClient::new(sender))
    }

    /// Runs the actor's event loop until every client has been dropped.
    pub async fn run(mut self) {
        // Extract just the type name (e.g., "User" instead of "rpc_server::model::user::User")
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.repository.find_by_id(&id);
                    debug!(entity_type, %id, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { respond_to } => {
                    let items = self.repository.find_all();
                    debug!(entity_type, count = items.len(), "List");
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::FindBy {
                    predicate,
                    respond_to,
                } => {
                    let item = self.repository.find_by(&*predicate);
                    debug!(entity_type, found = item.is_some(), "FindBy");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Insert { entity, respond_to } => {
                    debug!(entity_type, ?entity, "Insert");
                    let result = self.repository.insert(entity);
                    match &result {
                        Ok(item) => {
                            info!(entity_type, id = %item.id(), size = self.repository.len(), "Created")
                        }
                        Err(e) => warn!(entity_type, error = %e, "Insert failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Update {
                    id,
                    patch,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?patch, "Update");
                    let result = self.repository.update_partial(&id, patch);
                    match &result {
                        Ok(_) => info!(entity_type, %id, "Updated"),
                        Err(e) => warn!(entity_type, %id, error = %e, "Update failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let removed = self.repository.delete(&id);
                    if removed {
                        info!(entity_type, %id, size = self.repository.len(), "Deleted");
                    } else {
                        debug!(entity_type, %id, "Delete of absent id");
                    }
                    let _ = respond_to.send(Ok(removed));
                }
                ResourceRequest::Transaction { op } => {
                    debug!(entity_type, "Transaction");
                    op(self.repository.as_mut());
                }
            }
        }

        info!(entity_type, size = self.repository.len(), "Shutdown");
    }
}
