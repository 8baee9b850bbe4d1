//! # RPC Server
//!
//! The concrete application: User and Todo resources exposed as typed procedures over
//! HTTP. This library exposes the modules for the binary and for integration testing.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod routers;
pub mod todo_service;
pub mod transport;
pub mod user_service;
