//! Startup and shutdown failures of the server process.

use crate::config::ConfigError;
use crate::user_service::UserError;
use rpc_framework::RouterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("router error: {0}")]
    Router(#[from] RouterError),

    #[error("seeding failed: {0}")]
    Seed(#[from] UserError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    #[error("shutdown failed: {0}")]
    Shutdown(String),
}
