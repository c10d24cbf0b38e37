//! Structured tracing for the monitor.
//!
//! Spans:
//!
//! - `monitor.invoke`: one invocation, records region and warning counts
//! - `region.collect`: usage collection for one region
//! - `notify.publish`: one notification send, records latency and outcome
//!
//! The library only emits events. Binaries install a subscriber with
//! [`init_tracing_subscriber`].

mod spans;

pub use spans::{PublishSpan, TracingConfig, TracingLevel, invocation_span, region_span};

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence over the configured level. Returns `false` when a
/// global subscriber was already installed.
pub fn init_tracing_subscriber(config: &TracingConfig) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(
            service = config.service_name.as_deref().unwrap_or(env!("CARGO_PKG_NAME")),
            level = config.level.as_str(),
            "Tracing subscriber installed"
        );
    }
    installed
}
