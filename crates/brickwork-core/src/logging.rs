use tracing_subscriber::EnvFilter;

/// Default filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "brickwork=debug,brickwork_core=info,brickwork_layout=info";

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    // A subscriber may already be installed (tests, host applications).
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
