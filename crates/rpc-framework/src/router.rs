//! # Procedure Router
//!
//! [`Router`] collects procedure declarations, optionally under an alias, and nests
//! sub-routers. [`Router::build`] flattens the tree into a [`ProcedureRegistry`]:
//! an immutable table from fully qualified name (`todo.getTodoById`) to procedure.
//! The registry is built once at startup and only read afterwards.
//!
//! ## Invocation pipeline
//!
//! [`ProcedureRegistry::invoke`] runs the same steps for every call:
//!
//! 1. Resolve the exact name; unknown names fail with `NOT_FOUND`.
//! 2. Reject a call whose kind differs from the declaration (`METHOD_NOT_SUPPORTED`).
//! 3. Build a fresh [`Context`](crate::Context) from the request headers.
//! 4. Validate the input, if the procedure declares one. On failure the handler is
//!    never run and the caller gets `BAD_INPUT` with every violation.
//! 5. Run the handler. Its domain error is passed through with its code intact.
//!    A panicking handler is reported as `INTERNAL`.
//! 6. Validate the result against the output schema. A mismatch is the handler's
//!    fault and is reported as `INTERNAL`.

use crate::context::create_context;
use crate::procedure::{ErasedHandler, Procedure, ProcedureKind, Visibility};
use crate::rpc_error::{ErrorCode, RpcError};
use crate::schema::Schema;
use futures_util::FutureExt;
use http::HeaderMap;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use thiserror::Error;
use tracing::{debug, error, info_span, warn, Instrument};

/// Separator between router aliases and procedure names.
pub const PATH_SEPARATOR: char = '.';

/// Errors detected while building a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    #[error("procedure `{0}` is declared more than once")]
    DuplicateProcedure(String),
    #[error("procedure `{0}` has no output schema")]
    MissingOutput(String),
    #[error("procedure `{0}` has no handler")]
    MissingHandler(String),
    #[error("invalid procedure or alias name `{0}`")]
    InvalidName(String),
}

/// A tree of procedure declarations.
#[derive(Debug, Default)]
pub struct Router {
    alias: Option<String>,
    procedures: Vec<Procedure>,
    children: Vec<Router>,
}

impl Router {
    /// A root router; its procedures are addressed by their bare names.
    pub fn new() -> Self {
        Self::default()
    }

    /// A router whose procedures are addressed as `alias.name` once merged.
    pub fn with_alias(alias: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..Self::default()
        }
    }

    pub fn procedure(mut self, procedure: Procedure) -> Self {
        self.procedures.push(procedure);
        self
    }

    /// Mounts `child` under this router (under the child's alias, if it has one).
    pub fn merge(mut self, child: Router) -> Self {
        self.children.push(child);
        self
    }

    /// Flattens the tree into an immutable registry.
    pub fn build(self) -> Result<ProcedureRegistry, RouterError> {
        let mut procedures = HashMap::new();
        self.flatten("", &mut procedures)?;
        Ok(ProcedureRegistry { procedures })
    }

    fn flatten(
        self,
        prefix: &str,
        table: &mut HashMap<String, RegisteredProcedure>,
    ) -> Result<(), RouterError> {
        let prefix = match &self.alias {
            Some(alias) => join(prefix, checked_name(alias)?),
            None => prefix.to_string(),
        };

        for procedure in self.procedures {
            let path = join(&prefix, checked_name(&procedure.name)?);
            let output = procedure
                .output
                .ok_or_else(|| RouterError::MissingOutput(path.clone()))?;
            let handler = procedure
                .handler
                .ok_or_else(|| RouterError::MissingHandler(path.clone()))?;
            if table.contains_key(&path) {
                return Err(RouterError::DuplicateProcedure(path));
            }
            table.insert(
                path,
                RegisteredProcedure {
                    kind: procedure.kind,
                    visibility: procedure.visibility,
                    input: procedure.input,
                    output,
                    handler,
                },
            );
        }

        for child in self.children {
            child.flatten(&prefix, table)?;
        }
        Ok(())
    }
}

fn checked_name(name: &str) -> Result<&str, RouterError> {
    if name.is_empty() || name.contains(PATH_SEPARATOR) || name.contains('/') {
        return Err(RouterError::InvalidName(name.to_string()));
    }
    Ok(name)
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}{PATH_SEPARATOR}{name}")
    }
}

struct RegisteredProcedure {
    kind: ProcedureKind,
    visibility: Visibility,
    input: Option<Schema>,
    output: Schema,
    handler: ErasedHandler,
}

/// Public description of a registered procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcedureInfo {
    pub path: String,
    pub kind: ProcedureKind,
    pub visibility: Visibility,
    pub takes_input: bool,
}

/// One call as seen by the router, independent of any transport.
#[derive(Debug, Clone)]
pub struct Call {
    pub path: String,
    pub kind: ProcedureKind,
    pub headers: HeaderMap,
    pub input: Option<Value>,
}

impl Call {
    pub fn query(path: impl Into<String>) -> Self {
        Self::new(path, ProcedureKind::Query)
    }

    pub fn mutation(path: impl Into<String>) -> Self {
        Self::new(path, ProcedureKind::Mutation)
    }

    fn new(path: impl Into<String>, kind: ProcedureKind) -> Self {
        Self {
            path: path.into(),
            kind,
            headers: HeaderMap::new(),
            input: None,
        }
    }

    pub fn with_input(mut self, input: Value) -> Self {
        self.input = Some(input);
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

/// Immutable name → procedure table produced by [`Router::build`].
pub struct ProcedureRegistry {
    procedures: HashMap<String, RegisteredProcedure>,
}

impl ProcedureRegistry {
    /// Lists every registered procedure, sorted by path.
    pub fn procedures(&self) -> Vec<ProcedureInfo> {
        let mut infos: Vec<_> = self
            .procedures
            .iter()
            .map(|(path, procedure)| ProcedureInfo {
                path: path.clone(),
                kind: procedure.kind,
                visibility: procedure.visibility,
                takes_input: procedure.input.is_some(),
            })
            .collect();
        infos.sort_by(|a, b| a.path.cmp(&b.path));
        infos
    }

    pub fn contains(&self, path: &str) -> bool {
        self.procedures.contains_key(path)
    }

    /// Runs one call through the pipeline described in the module docs.
    pub async fn invoke(&self, call: Call) -> Result<Value, RpcError> {
        let span = info_span!("procedure", path = %call.path, kind = %call.kind);
        let result = self.dispatch(call).instrument(span.clone()).await;
        if let Err(err) = &result {
            let _entered = span.enter();
            match err.code {
                ErrorCode::Internal => error!(error = %err, "Procedure failed"),
                _ => debug!(code = %err.code, message = %err.message, "Procedure rejected"),
            }
        }
        result
    }

    async fn dispatch(&self, call: Call) -> Result<Value, RpcError> {
        let Call {
            path,
            kind,
            headers,
            input,
        } = call;

        let procedure = self.procedures.get(&path).ok_or_else(|| {
            warn!("Unknown procedure");
            RpcError::not_found(format!("No procedure found on path \"{path}\""))
        })?;

        if procedure.kind != kind {
            return Err(RpcError::method_not_supported(format!(
                "Procedure \"{path}\" is a {} and cannot be called as a {kind}",
                procedure.kind
            )));
        }

        let ctx = create_context(&headers);

        let input = match &procedure.input {
            Some(schema) => schema
                .validate(&input.unwrap_or(Value::Null))
                .map_err(|errors| {
                    RpcError::bad_input("Input validation failed", errors.into_violations())
                })?,
            None => Value::Null,
        };

        let output = AssertUnwindSafe((procedure.handler)(ctx, input))
            .catch_unwind()
            .await
            .map_err(|_| RpcError::internal(format!("Handler for \"{path}\" panicked")))??;

        procedure.output.validate(&output).map_err(|errors| {
            RpcError::internal(format!("Output validation failed for \"{path}\": {errors}"))
        })
    }
}

impl fmt::Debug for ProcedureRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcedureRegistry")
            .field("procedures", &self.procedures())
            .finish()
    }
}
