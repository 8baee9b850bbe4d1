//! # HTTP Transport
//!
//! Mounts a [`ProcedureRegistry`] under a URL prefix and speaks HTTP/1 via hyper.
//!
//! | Request                                            | Invocation                  |
//! |----------------------------------------------------|-----------------------------|
//! | `GET  {prefix}/{name}?input=<url-encoded JSON>`    | query `name`                |
//! | `POST {prefix}/{name}` with a JSON body            | mutation `name`             |
//!
//! A successful call answers `200` with the procedure's output as the JSON body.
//! A failed call answers with the status of its [`ErrorCode`] and an
//! [`ErrorEnvelope`](rpc_framework::ErrorEnvelope) body. Anything outside the prefix is
//! a `404` with a `NOT_FOUND` envelope.

use bytes::Bytes;
use http::header::{ALLOW, CONTENT_TYPE};
use http::{HeaderValue, Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use rpc_framework::{Call, ErrorCode, ProcedureKind, ProcedureRegistry, RpcError};
use serde::Serialize;
use serde_json::Value;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// How long in-flight connections get to finish after shutdown is requested.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Largest request body accepted (1 MiB).
pub const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Pause after a failed accept, doubled per consecutive failure up to the max.
const ACCEPT_BACKOFF_BASE: Duration = Duration::from_millis(10);
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type HttpResponse = Response<Full<Bytes>>;

/// Translates HTTP requests into procedure calls.
pub struct RpcHttpService {
    registry: Arc<ProcedureRegistry>,
    prefix: String,
    expose_internal: bool,
}

impl RpcHttpService {
    /// `prefix` is matched literally (`/trpc`); an empty prefix mounts at the root.
    pub fn new(registry: Arc<ProcedureRegistry>, prefix: impl Into<String>, expose_internal: bool) -> Self {
        Self {
            registry,
            prefix: prefix.into(),
            expose_internal,
        }
    }

    /// Handles one request. Never fails: every error becomes an envelope response.
    pub async fn handle<B>(&self, req: Request<B>) -> HttpResponse
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        debug!(method = %req.method(), path = %req.uri().path(), "Request");
        match self.dispatch(req).await {
            Ok(output) => json_response(StatusCode::OK, &output),
            Err(err) => self.error_response(&err),
        }
    }

    async fn dispatch<B>(&self, req: Request<B>) -> Result<Value, RpcError>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let name = self.procedure_name(req.uri().path()).ok_or_else(|| {
            RpcError::not_found(format!("No route for {}", req.uri().path()))
        })?;

        let kind = match *req.method() {
            Method::GET => ProcedureKind::Query,
            Method::POST => ProcedureKind::Mutation,
            _ => {
                return Err(RpcError::method_not_supported(format!(
                    "Unsupported HTTP method {}",
                    req.method()
                )))
            }
        };
        let call = match kind {
            ProcedureKind::Query => Call::query(name),
            ProcedureKind::Mutation => Call::mutation(name),
        }
        .with_headers(req.headers().clone());

        let input = match kind {
            ProcedureKind::Query => query_input(req.uri().query())?,
            ProcedureKind::Mutation => body_input(req.into_body()).await?,
        };

        let call = match input {
            Some(input) => call.with_input(input),
            None => call,
        };
        self.registry.invoke(call).await
    }

    fn procedure_name(&self, path: &str) -> Option<String> {
        let name = path.strip_prefix(self.prefix.as_str())?.strip_prefix('/')?;
        (!name.is_empty() && !name.contains('/')).then(|| name.to_string())
    }

    fn error_response(&self, err: &RpcError) -> HttpResponse {
        let mut response = json_response(err.code.http_status(), &err.to_envelope(self.expose_internal));
        if err.code == ErrorCode::MethodNotSupported {
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("GET, POST"));
        }
        response
    }
}

/// Reads the `input` query parameter. Absent means the call carries no input.
fn query_input(query: Option<&str>) -> Result<Option<Value>, RpcError> {
    let Some(query) = query else {
        return Ok(None);
    };
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "input")
        .map(|(_, raw)| {
            serde_json::from_str(&raw).map_err(|e| {
                RpcError::bad_input(format!("Malformed JSON in input parameter: {e}"), Vec::new())
            })
        })
        .transpose()
}

/// Reads a JSON request body of at most [`MAX_BODY_SIZE`] bytes. An empty body
/// means the call carries no input.
async fn body_input<B>(body: B) -> Result<Option<Value>, RpcError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let bytes = Limited::new(body, MAX_BODY_SIZE)
        .collect()
        .await
        .map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                RpcError::bad_input(
                    format!("Request body exceeds {MAX_BODY_SIZE} bytes"),
                    Vec::new(),
                )
            } else {
                RpcError::bad_input(format!("Failed to read request body: {e}"), Vec::new())
            }
        })?
        .to_bytes();
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| RpcError::bad_input(format!("Malformed JSON body: {e}"), Vec::new()))
}

fn json_response(status: StatusCode, body: &impl Serialize) -> HttpResponse {
    let body = match serde_json::to_vec(body) {
        Ok(body) => body,
        Err(e) => {
            error!(error = %e, "Failed to serialize response");
            return Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Full::new(Bytes::new()))
                .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())));
        }
    };
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

/// Accepts connections on `listener` until `shutdown` resolves, then lets open
/// connections finish for up to [`SHUTDOWN_GRACE`].
pub async fn serve(
    service: Arc<RpcHttpService>,
    listener: TcpListener,
    shutdown: impl Future<Output = ()>,
) {
    let (stop_tx, stop_rx) = watch::channel(false);
    let mut connections = JoinSet::new();
    tokio::pin!(shutdown);
    let mut accept_failures: u32 = 0;

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, remote_addr)) => {
                    accept_failures = 0;
                    let service = Arc::clone(&service);
                    let mut stop_rx = stop_rx.clone();
                    connections.spawn(async move {
                        let io = TokioIo::new(stream);
                        let svc = service_fn(move |req: Request<Incoming>| {
                            let service = Arc::clone(&service);
                            async move { Ok::<_, Infallible>(service.handle(req).await) }
                        });
                        let conn = http1::Builder::new().serve_connection(io, svc);
                        tokio::pin!(conn);

                        let mut stopping = false;
                        let result = loop {
                            tokio::select! {
                                result = conn.as_mut() => break result,
                                _ = stop_rx.changed(), if !stopping => {
                                    stopping = true;
                                    conn.as_mut().graceful_shutdown();
                                }
                            }
                        };
                        if let Err(e) = result {
                            debug!(%remote_addr, error = %e, "Connection closed with error");
                        }
                    });
                }
                Err(e) => {
                    accept_failures = accept_failures.saturating_add(1);
                    let pause = accept_backoff(accept_failures);
                    error!(error = %e, ?pause, "Failed to accept connection");
                    tokio::select! {
                        () = tokio::time::sleep(pause) => {}
                        () = &mut shutdown => {
                            info!("Shutdown signal received, stopping server");
                            break;
                        }
                    }
                }
            },
            () = &mut shutdown => {
                info!("Shutdown signal received, stopping server");
                break;
            }
        }

        while connections.try_join_next().is_some() {}
    }

    let _ = stop_tx.send(true);
    let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
        while connections.join_next().await.is_some() {}
    })
    .await;
    if drained.is_err() {
        warn!(remaining = connections.len(), "Shutdown grace period elapsed, aborting connections");
        connections.shutdown().await;
    }
    info!("Server stopped");
}

/// Back-off after the `failures`-th consecutive accept error (file descriptor
/// exhaustion and the like), so a persistent failure does not spin the loop.
fn accept_backoff(failures: u32) -> Duration {
    let exponent = failures.saturating_sub(1).min(16);
    ACCEPT_BACKOFF_BASE
        .saturating_mul(1 << exponent)
        .min(ACCEPT_BACKOFF_MAX)
}
