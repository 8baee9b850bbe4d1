//! # ActorEntity Trait
//!
//! The `ActorEntity` trait is the contract every resource kind (User, Todo, …) implements
//! to be stored in a [`Repository`](crate::Repository) and owned by a
//! [`ResourceActor`](crate::ResourceActor).
//!
//! Associated types keep each collection honest: a `User` repository only accepts a
//! `UserCreate` payload and a `UserPatch` update, and the compiler rejects anything else.
//!
//! Ids are never supplied by clients. The repository hands out fresh numeric ids from a
//! counter that only moves forward, and `Id: From<u64>` turns them into the entity's
//! own identifier type.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any resource entity must implement to be managed by a repository.
pub trait ActorEntity: Clone + Send + Sync + Debug + 'static {
    /// The unique identifier for this entity.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + From<u64>;

    /// The data required to create a new instance (DTO).
    type Create: Send + Sync + Debug;

    /// A partial update. Every field is optional; absent fields are left untouched.
    type Patch: Send + Sync + Debug;

    /// Returns the entity's identifier.
    fn id(&self) -> &Self::Id;

    /// Construct the full entity from a freshly assigned id and the creation payload.
    fn from_create(id: Self::Id, params: Self::Create) -> Self;

    /// Merge the supplied fields of `patch` onto `self`.
    fn apply_patch(&mut self, patch: Self::Patch);
}
