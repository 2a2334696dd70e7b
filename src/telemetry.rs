//! Opt-in tracing setup for hosts that don't install their own subscriber.
//!
//! Collector and invoker events use the `sim_figures` target, so a host
//! filter can raise or silence them without touching the rest of the app.

/// Filter used when `RUST_LOG` is unset: crate events at debug, others at info.
pub const DEFAULT_TRACING_FILTER: &str = "info,sim_figures=debug";

/// Installs a compact `fmt` subscriber with thread names, so every figure
/// worker (`figure-<name>`) is visible in the output.
///
/// Returns `false` when the `telemetry` feature is off or a global subscriber
/// is already set.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_TRACING_FILTER));
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_thread_names(true)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}
