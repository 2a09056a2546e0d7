//! CLI support for the scap-relay maintenance binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing for CLI runs. Quieter default than the server.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "scap_relay=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
