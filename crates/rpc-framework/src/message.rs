//! # Generic Messages
//!
//! Message types exchanged between a [`ResourceClient`](crate::ResourceClient) and
//! the [`ResourceActor`](crate::ResourceActor) that owns a repository.

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::repository::Repository;
use std::fmt;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Predicate used by [`ResourceRequest::FindBy`].
pub type Predicate<T> = Box<dyn Fn(&T) -> bool + Send>;

/// A unit of work run against the repository inside the actor, with no other
/// request interleaved. The closure owns its own reply channel.
pub type Transaction<T> = Box<dyn FnOnce(&mut dyn Repository<T>) + Send>;

/// Request sent to a resource actor.
///
/// One variant per repository operation, plus [`Transaction`](ResourceRequest::Transaction)
/// for read-modify-write sequences (check-then-insert) that must not be split
/// across two messages.
pub enum ResourceRequest<T: ActorEntity> {
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
    FindBy {
        predicate: Predicate<T>,
        respond_to: Response<Option<T>>,
    },
    Insert {
        entity: T,
        respond_to: Response<T>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<bool>,
    },
    Transaction {
        op: Transaction<T>,
    },
}

impl<T: ActorEntity> fmt::Debug for ResourceRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get { id, .. } => f.debug_struct("Get").field("id", id).finish(),
            Self::List { .. } => f.write_str("List"),
            Self::FindBy { .. } => f.write_str("FindBy"),
            Self::Insert { entity, .. } => f.debug_struct("Insert").field("entity", entity).finish(),
            Self::Update { id, patch, .. } => f
                .debug_struct("Update")
                .field("id", id)
                .field("patch", patch)
                .finish(),
            Self::Delete { id, .. } => f.debug_struct("Delete").field("id", id).finish(),
            Self::Transaction { .. } => f.write_str("Transaction"),
        }
    }
}
