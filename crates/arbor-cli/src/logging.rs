//! Side-channel diagnostics for the reporter itself.
//!
//! Warnings about malformed input and unknown event types go to stderr via
//! `tracing`, never into the rendered report on stdout. Verbosity comes from
//! `RUST_LOG` and defaults to `warn`:
//!
//! ```bash
//! RUST_LOG=arbor=debug arbor events.ndjson
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
