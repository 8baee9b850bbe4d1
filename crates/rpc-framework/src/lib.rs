//! # RPC Framework
//!
//! Building blocks for a typed remote-procedure layer served over HTTP, and for the
//! in-memory resources behind it. Two halves:
//!
//! 1. **Procedure layer** ([`Procedure`], [`Router`], [`schema`]) - declare named
//!    queries and mutations with input and output schemas, then flatten them into an
//!    immutable [`ProcedureRegistry`] that validates every call on the way in and out.
//! 2. **Resource layer** ([`ResourceActor`], [`ResourceClient`], [`Repository`]) - an
//!    actor owns each collection and processes requests one at a time, so concurrent
//!    callers never see a half-applied write.
//!
//! ## Declaring procedures
//!
//! ```rust
//! use rpc_framework::{Call, Context, Procedure, Router, RpcError};
//! use rpc_framework::schema::Schema;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let greet = Procedure::query("greet")
//!         .input(Schema::object().required("name", Schema::string().min_len(1)))
//!         .output(Schema::string())
//!         .handler(|_ctx: Context, input: serde_json::Value| async move {
//!             Ok::<_, RpcError>(format!("Hello, {}", input["name"].as_str().unwrap_or("")))
//!         });
//!
//!     let registry = Router::new()
//!         .merge(Router::with_alias("hello").procedure(greet))
//!         .build()
//!         .unwrap();
//!
//!     let out = registry
//!         .invoke(Call::query("hello.greet").with_input(json!({ "name": "Ada" })))
//!         .await
//!         .unwrap();
//!     assert_eq!(out, json!("Hello, Ada"));
//! }
//! ```
//!
//! ## Owning a collection
//!
//! ```rust
//! use rpc_framework::{ActorEntity, ResourceActor};
//!
//! #[derive(Clone, Debug)]
//! struct Note { id: u64, body: String }
//!
//! impl ActorEntity for Note {
//!     type Id = u64;
//!     type Create = String;
//!     type Patch = String;
//!     fn id(&self) -> &u64 { &self.id }
//!     fn from_create(id: u64, body: String) -> Self { Self { id, body } }
//!     fn apply_patch(&mut self, body: String) { self.body = body; }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = ResourceActor::<Note>::new(16);
//!     let handle = tokio::spawn(actor.run());
//!
//!     let note = client
//!         .transaction(|repo| {
//!             let id = repo.next_id();
//!             repo.insert(Note::from_create(id, "first".into()))
//!         })
//!         .await
//!         .unwrap()
//!         .unwrap();
//!     assert_eq!(client.get(note.id).await.unwrap().unwrap().body, "first");
//!
//!     drop(client);
//!     handle.await.unwrap();
//! }
//! ```
//!
//! ## Concurrency Model
//!
//! - Each actor runs in its own Tokio task and owns its repository outright
//! - Requests are processed **sequentially** within an actor, so no locks are needed
//! - A [`ResourceClient::transaction`] runs a closure inside the actor, which makes
//!   check-then-insert sequences atomic
//! - Dropping every client ends the actor's loop
//!
//! ## Testing
//!
//! [`mock::MockClient`] answers a real [`ResourceClient`] from a queue of expectations,
//! so service logic can be tested without spawning actors.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod context;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod procedure;
pub mod repository;
pub mod router;
pub mod rpc_error;
pub mod schema;
pub mod telemetry;

// Re-export core types for convenience
pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use context::{create_context, Context};
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response};
pub use procedure::{Procedure, ProcedureKind, Visibility};
pub use repository::{MemoryRepository, Repository};
pub use router::{Call, ProcedureInfo, ProcedureRegistry, Router, RouterError};
pub use rpc_error::{ErrorCode, ErrorEnvelope, RpcError};
