//! # Call Context
//!
//! Every procedure invocation receives a freshly built [`Context`] derived from the
//! transport request's headers. The identity token is carried as-is: verifying it is
//! left to whichever handler needs an authenticated caller.

use http::header::AUTHORIZATION;
use http::HeaderMap;

/// Immutable per-call metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    identity: Option<String>,
}

impl Context {
    /// A context with no identity, for in-process calls and tests.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_identity(identity: impl Into<String>) -> Self {
        Self {
            identity: Some(identity.into()),
        }
    }

    /// The raw, unverified identity token supplied by the caller.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }
}

/// Builds the context for one call from the request headers.
///
/// The `Authorization` header value becomes the identity verbatim. A missing, empty
/// or non-UTF-8 header yields no identity.
pub fn create_context(headers: &HeaderMap) -> Context {
    let identity = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_owned);
    Context { identity }
}
