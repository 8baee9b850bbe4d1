//! # Procedure Declarations
//!
//! A [`Procedure`] binds a name to its kind, schemas and handler. Declarations are
//! plain values assembled with a builder and handed to a [`Router`](crate::Router);
//! nothing is discovered by reflection.
//!
//! Handlers are ordinary async functions over typed values:
//!
//! ```rust
//! use rpc_framework::{Context, Procedure, RpcError};
//! use rpc_framework::schema::Schema;
//!
//! let echo = Procedure::query("echo")
//!     .input(Schema::string())
//!     .output(Schema::string())
//!     .handler(|_ctx: Context, text: String| async move { Ok::<_, RpcError>(text) });
//! assert_eq!(echo.name(), "echo");
//! ```
//!
//! The router converts between JSON and the handler's types: the validated input is
//! deserialized into the handler's argument and the handler's result is serialized
//! before the output schema checks it. A procedure without an input schema receives `()`.

use crate::context::Context;
use crate::rpc_error::RpcError;
use crate::schema::Schema;
use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Whether a procedure reads or changes state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcedureKind {
    /// Side-effect free; safe to retry or cache.
    Query,
    /// Changes state; not safe to retry blindly.
    Mutation,
}

impl fmt::Display for ProcedureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => f.write_str("query"),
            Self::Mutation => f.write_str("mutation"),
        }
    }
}

/// Who may call a procedure. The router applies no gate for [`Visibility::Public`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
}

/// Type-erased handler: JSON in, JSON out.
pub(crate) type ErasedHandler =
    Arc<dyn Fn(Context, Value) -> BoxFuture<'static, Result<Value, RpcError>> + Send + Sync>;

/// A procedure declaration under construction.
pub struct Procedure {
    pub(crate) name: String,
    pub(crate) kind: ProcedureKind,
    pub(crate) visibility: Visibility,
    pub(crate) input: Option<Schema>,
    pub(crate) output: Option<Schema>,
    pub(crate) handler: Option<ErasedHandler>,
}

impl Procedure {
    fn new(name: impl Into<String>, kind: ProcedureKind) -> Self {
        Self {
            name: name.into(),
            kind,
            visibility: Visibility::Public,
            input: None,
            output: None,
            handler: None,
        }
    }

    /// Declares a read-only procedure.
    pub fn query(name: impl Into<String>) -> Self {
        Self::new(name, ProcedureKind::Query)
    }

    /// Declares a state-changing procedure.
    pub fn mutation(name: impl Into<String>) -> Self {
        Self::new(name, ProcedureKind::Mutation)
    }

    pub fn input(mut self, schema: impl Into<Schema>) -> Self {
        self.input = Some(schema.into());
        self
    }

    /// Every procedure must declare its output; the router refuses to build otherwise.
    pub fn output(mut self, schema: impl Into<Schema>) -> Self {
        self.output = Some(schema.into());
        self
    }

    pub fn handler<I, O, E, F, Fut>(mut self, handler: F) -> Self
    where
        I: DeserializeOwned + Send + 'static,
        O: Serialize + Send + 'static,
        E: Into<RpcError> + Send + 'static,
        F: Fn(Context, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, E>> + Send + 'static,
    {
        let name = self.name.clone();
        let handler = Arc::new(handler);
        self.handler = Some(Arc::new(
            move |ctx: Context, raw: Value| -> BoxFuture<'static, Result<Value, RpcError>> {
                let handler = Arc::clone(&handler);
                let name = name.clone();
                Box::pin(async move {
                    // Schema-valid input the handler type rejects is a declaration bug.
                    let input = serde_json::from_value::<I>(raw).map_err(|e| {
                        RpcError::internal(format!(
                            "input of `{name}` does not match its handler: {e}"
                        ))
                    })?;
                    let output = handler(ctx, input).await.map_err(Into::<RpcError>::into)?;
                    serde_json::to_value(output).map_err(|e| {
                        RpcError::internal(format!(
                            "output of `{name}` could not be serialized: {e}"
                        ))
                    })
                })
            },
        ));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ProcedureKind {
        self.kind
    }
}

impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Procedure")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("visibility", &self.visibility)
            .field("input", &self.input)
            .field("output", &self.output)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}
