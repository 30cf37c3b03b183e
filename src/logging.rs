//! Subscriber setup for the binaries. The library only emits `tracing` events.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// `verbosity` 0 → warn, 1 → info, 2 → debug, 3+ → trace. `RUST_LOG` wins when set.
pub fn init(verbosity: u8) {
    static INITIALISED: OnceLock<()> = OnceLock::new();

    INITIALISED.get_or_init(|| {
        let filter = match verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        let _ = tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
            .with(tracing_subscriber::fmt::layer().without_time().with_writer(std::io::stderr))
            .try_init();
    });
}
