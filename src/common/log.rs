//! Logging setup on top of `tracing`.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `filter` uses `EnvFilter` directive syntax
/// (`info`, `healthpredict=debug,tower_http=warn`, ...); an unparsable
/// directive falls back to `info`.
pub fn init(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
