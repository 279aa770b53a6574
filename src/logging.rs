//! Tracing setup: stdout always, plus a non-blocking daily file when configured.

use crate::config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` wins over the configured level. Keep the returned guard alive
/// for the whole process or buffered file lines are lost on exit.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let stdout_layer = fmt::layer().with_target(true).with_writer(std::io::stdout);

    match &config.directory {
        Some(directory) => {
            let file_appender = tracing_appender::rolling::daily(directory, "kraken_swing.log");
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .init();
            None
        }
    }
}
