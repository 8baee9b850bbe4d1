//! # ActorClient Trait
//!
//! Common interface for resource services: supplies `get_all` and `delete` on top of
//! a generic [`ResourceClient`], translating framework failures into the service's
//! own error type.
use crate::{ActorEntity, FrameworkError, ResourceClient};
use async_trait::async_trait;

/// Trait for resource-specific services to inherit the operations that carry no
/// business rules.
///
/// Lookups that must fail on a missing id (`get_by_id`) and writes that enforce
/// invariants (`create`, `update`) stay on the concrete service.
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    /// The resource-specific error type.
    type Error: Send + Sync;

    /// Access the inner generic ResourceClient.
    fn inner(&self) -> &ResourceClient<T>;

    /// Map framework errors to the specific resource error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Fetch the whole collection in insertion order.
    #[tracing::instrument(skip(self))]
    async fn get_all(&self) -> Result<Vec<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().list().await.map_err(Self::map_error)
    }

    /// Delete an entity by ID. Returns `false` when the id was not present.
    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: T::Id) -> Result<bool, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().delete(id).await.map_err(Self::map_error)
    }
}
