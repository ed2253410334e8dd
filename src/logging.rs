use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Options for the global tracing subscriber
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Default to `debug` instead of `info` when `RUST_LOG` is unset
    pub debug: bool,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Also write daily rolling log files into this directory
    pub log_dir: Option<String>,
}

/// Builds the filter from `RUST_LOG`, falling back to the default level
pub fn env_filter(debug: bool) -> EnvFilter {
    let default_level = if debug { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Installs the global tracing subscriber
///
/// ### Returns
///
/// The file writer's guard when `log_dir` is set. Keep it alive for the life
/// of the process; dropping it flushes and stops the file writer.
pub fn init_tracing(options: &LogOptions) -> anyhow::Result<Option<WorkerGuard>> {
    let stdout_layer = if options.json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().boxed()
    };

    let (file_layer, guard) = match &options.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "remindr.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer).boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter(options.debug))
        .with(stdout_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}
