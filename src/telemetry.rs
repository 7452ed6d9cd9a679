use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "pf_ledger=info,tower_http=info";

/// Installs the global fmt subscriber. `RUST_LOG` overrides the default filter.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}
