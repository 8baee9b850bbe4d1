//! # RPC Server
//!
//! Serves the User and Todo procedures over HTTP.
//!
//! ## Running
//!
//! ```bash
//! RUST_LOG=info cargo run -p rpc-server
//! curl 'http://localhost:4000/trpc/getUsers'
//! curl 'http://localhost:4000/trpc/getUserById?input=%221%22'
//! curl -X POST -d '{"name":"Dana","email":"dana@example.com"}' \
//!      'http://localhost:4000/trpc/createUser'
//! curl -X POST -d '{"title":"Write docs"}' 'http://localhost:4000/trpc/todo.createTodo'
//! ```
//!
//! Configuration comes from the environment (see [`rpc_server::config`]).
//! Ctrl-C stops accepting connections, drains the open ones and shuts the actors down.

use rpc_framework::telemetry::setup_tracing;
use rpc_server::config::ServerConfig;
use rpc_server::error::AppError;
use rpc_server::lifecycle::AppSystem;
use rpc_server::transport::{serve, RpcHttpService};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = ServerConfig::from_env()?;
    info!(?config, "Starting server");

    let system = AppSystem::start()?;
    if config.seed_users {
        system.seed_demo_users().await?;
    }

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| AppError::Bind { addr, source })?;
    info!(%addr, prefix = %config.prefix, "Server listening");

    let service = Arc::new(RpcHttpService::new(
        system.registry(),
        config.prefix.clone(),
        config.environment.expose_internal_errors(),
    ));
    serve(service, listener, shutdown_signal()).await;

    system.shutdown().await.map_err(AppError::Shutdown)?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
