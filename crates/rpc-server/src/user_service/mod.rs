//! # User Service
//!
//! Business rules for users on top of a `ResourceClient<User>`:
//!
//! - `get_by_id` fails with [`UserError::NotFound`] for an unknown id.
//! - `create` rejects an email that is already registered. The lookup, id
//!   assignment and insert run as one transaction inside the actor, so two
//!   concurrent creates with the same email cannot both succeed.
//! - `update` applies the same email rule, ignoring the user being updated.
//! - `get_all` and `delete` come from [`ActorClient`]; deleting an unknown id
//!   returns `false`.
//!
//! ```rust
//! use rpc_framework::ActorClient;
//! use rpc_server::model::UserCreate;
//! use rpc_server::user_service;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (actor, users) = user_service::new();
//!     tokio::spawn(actor.run());
//!
//!     let alice = users.create(UserCreate::new("Alice", "alice@example.com")).await?;
//!     assert_eq!(users.get_by_id(alice.id.clone()).await?, alice);
//!     assert!(users.delete(alice.id).await?);
//!     Ok(())
//! }
//! ```

pub mod error;

pub use error::*;

use crate::model::{User, UserCreate, UserId, UserPatch};
use rpc_framework::{ActorClient, ActorEntity, FrameworkError, ResourceActor, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Creates a new User actor and the service in front of it.
pub fn new() -> (ResourceActor<User>, UserService) {
    let (actor, client) = ResourceActor::new(32);
    (actor, UserService::new(client))
}

/// Service for the User resource.
#[derive(Clone)]
pub struct UserService {
    inner: ResourceClient<User>,
}

impl UserService {
    pub fn new(inner: ResourceClient<User>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<User> for UserService {
    type Error = UserError;

    fn inner(&self) -> &ResourceClient<User> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        e.into()
    }
}

impl UserService {
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: UserId) -> Result<User, UserError> {
        debug!("Sending request");
        self.inner
            .get(id.clone())
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn create(&self, params: UserCreate) -> Result<User, UserError> {
        debug!("Sending request");
        self.inner
            .transaction(move |repo| {
                if repo.find_by(&|u: &User| u.email == params.email).is_some() {
                    return Err(UserError::EmailTaken(params.email));
                }
                let id = repo.next_id();
                Ok(repo.insert(User::from_create(id, params))?)
            })
            .await?
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: UserId, patch: UserPatch) -> Result<User, UserError> {
        debug!("Sending request");
        self.inner
            .transaction(move |repo| {
                if repo.find_by_id(&id).is_none() {
                    return Err(UserError::NotFound(id.to_string()));
                }
                if let Some(email) = &patch.email {
                    if repo.find_by(&|u: &User| &u.email == email && u.id != id).is_some() {
                        return Err(UserError::EmailTaken(email.clone()));
                    }
                }
                Ok(repo.update_partial(&id, patch)?)
            })
            .await?
    }
}
