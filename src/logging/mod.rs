use crate::cli::TracingFormat;
use crate::config::Config;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Build the filter: `RUST_LOG` when set, otherwise the configured level for
/// this crate and `warn` for everything else.
pub fn env_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let base_level = &config.log_level;
        EnvFilter::new(format!("warn,cycling_calendar={base_level},tower_http=info"))
    })
}

/// Configure and initialize logging for the application.
///
/// Events go to stderr so `render` can write the calendar to stdout.
pub fn setup_logging(config: &Config, tracing_format: TracingFormat) {
    let filter = env_filter(config);

    match tracing_format {
        TracingFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_writer(std::io::stderr)
                        .compact(),
                )
                .init();
        }
        TracingFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_writer(std::io::stderr)
                        .json()
                        .flatten_event(true),
                )
                .init();
        }
    }
}
