/// Initializes the tracing/logging infrastructure for the application.
///
/// Structured logging via the `tracing` crate:
/// - **Environment-based filtering**: controlled by `RUST_LOG`, `info` when unset
/// - **Compact formatting**: one line per event, span fields inline
///
/// # Environment Variables
///
/// - `RUST_LOG=info` - startup, actor lifecycle and failed calls
/// - `RUST_LOG=debug` - every procedure call and repository write
/// - `RUST_LOG=rpc_framework=debug` - debug only for the framework crate
///
/// Calling it twice is harmless; the second call leaves the first subscriber in place.
///
/// # Example
///
/// ```ignore
/// setup_tracing();
/// tracing::info!("Server started");
/// ```
pub fn setup_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}
