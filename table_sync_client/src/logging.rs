//! Terminal logging setup.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging for the client.
///
/// Output goes to stderr so it does not interleave with the table summary
/// on stdout. Levels come from `RUST_LOG`; the default keeps HTTP client
/// internals quiet. Records emitted through the `log` facade by the sync
/// library are captured as well.
///
/// # Example
///
/// ```no_run
/// use table_sync_client::logging;
///
/// logging::init();
/// tracing::info!("Client starting");
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::debug!("Logging initialized");
}
