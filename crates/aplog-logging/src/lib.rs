//! # aplog-logging
//!
//! Logging for the aplog access-point session analyser.
//!
//! ## Key Types
//!
//! - [`Logger`] - Pipeline progress reporting
//! - [`PipelineEvent`] - Progress event types
//! - [`LogFormat`] - Output formats (Pretty, JSON, Compact)
//!
//! Library diagnostics go through `tracing`; [`init_tracing`] installs the
//! subscriber.

mod events;

pub use events::{LogFormat, Logger, PipelineEvent, Stage};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing for the application. `RUST_LOG` overrides `level`.
pub fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_target(false).with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty | LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .init();
        }
    }
}
