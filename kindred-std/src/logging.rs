//! Tracing subscriber setup.

use crate::config::{LogConfig, LogFormat};
use tracing::Subscriber;
use tracing_subscriber::{EnvFilter, fmt::MakeWriter, util::SubscriberInitExt};

/// Install a global `fmt` subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence over `config.level`. Safe to call multiple
/// times; only the first call installs anything. Returns whether this call
/// installed the subscriber.
pub fn init(config: &LogConfig) -> bool {
    subscriber(config, std::io::stderr).try_init().is_ok()
}

fn subscriber<W>(config: &LogConfig, writer: W) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer);
    match config.format {
        LogFormat::Json => Box::new(
            builder
                .json()
                .with_timer(tracing_subscriber::fmt::time::SystemTime)
                .with_current_span(true)
                .finish(),
        ),
        LogFormat::Pretty => Box::new(builder.pretty().with_target(true).finish()),
    }
}
