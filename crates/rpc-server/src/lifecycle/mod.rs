//! # Lifecycle Management
//!
//! [`AppSystem`] owns the running application: one actor per resource kind, the
//! services in front of them, and the procedure registry built over those services.
//!
//! ## Startup
//!
//! 1. Spawn the User and Todo actors, each in its own Tokio task.
//! 2. Wrap their clients in [`UserService`] and [`TodoService`].
//! 3. Build the [`ProcedureRegistry`] from the app router. The registry's handlers
//!    hold clones of the services.
//!
//! ## Shutdown
//!
//! Actors stop once every client to them is gone. [`AppSystem::shutdown`] drops the
//! services and the registry, then waits for each actor task. Callers must drop any
//! other registry handles they cloned (the transport's, for instance) first, or the
//! wait never finishes.

use crate::model::UserCreate;
use crate::routers::build_registry;
use crate::todo_service::{self, TodoService};
use crate::user_service::{self, UserError, UserService};
use rpc_framework::{ProcedureRegistry, RouterError};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Users created by [`AppSystem::seed_demo_users`].
pub const DEMO_USERS: [(&str, &str); 3] = [
    ("Alice", "alice@example.com"),
    ("Bob", "bob@example.com"),
    ("Charlie", "charlie@example.com"),
];

pub struct AppSystem {
    pub user_service: UserService,
    pub todo_service: TodoService,
    registry: Arc<ProcedureRegistry>,
    handles: Vec<JoinHandle<()>>,
}

impl AppSystem {
    /// Spawns every actor and builds the registry. Must be called inside a Tokio runtime.
    pub fn start() -> Result<Self, RouterError> {
        let (user_actor, user_service) = user_service::new();
        let user_handle = tokio::spawn(user_actor.run());

        let (todo_actor, todo_service) = todo_service::new();
        let todo_handle = tokio::spawn(todo_actor.run());

        let registry = build_registry(user_service.clone(), todo_service.clone())?;
        info!(procedures = registry.procedures().len(), "Router built");

        Ok(Self {
            user_service,
            todo_service,
            registry: Arc::new(registry),
            handles: vec![user_handle, todo_handle],
        })
    }

    /// Shared handle to the registry for the transport.
    pub fn registry(&self) -> Arc<ProcedureRegistry> {
        Arc::clone(&self.registry)
    }

    /// Creates the demo users through the regular service path, so they receive ids
    /// `1`, `2` and `3` on a fresh system.
    pub async fn seed_demo_users(&self) -> Result<(), UserError> {
        for (name, email) in DEMO_USERS {
            self.user_service.create(UserCreate::new(name, email)).await?;
        }
        info!(count = DEMO_USERS.len(), "Seeded demo users");
        Ok(())
    }

    /// Gracefully shuts down the entire system.
    ///
    /// Returns `Err` if any actor task panicked.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        drop(self.registry);
        drop(self.user_service);
        drop(self.todo_service);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
