//! Console output for solver events.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

static INIT: OnceLock<()> = OnceLock::new();

/// Initializes tracing output for solver events.
///
/// Safe to call multiple times - only the first call has effect. Respects
/// `RUST_LOG`, defaulting to `info` for the engine and bridge crates.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::builder()
            .with_default_directive("planbridge_engine=info".parse().unwrap())
            .from_env_lossy()
            .add_directive("planbridge=info".parse().unwrap());

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    });
}
