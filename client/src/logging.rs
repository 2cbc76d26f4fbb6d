//! File-based logging initialization

use std::fs;

use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, util::SubscriberInitExt, EnvFilter};

use crate::config::ClientConfig;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "wallet_client=info,warn";

/// Initialize the logging system
///
/// Sets up:
/// - Daily-rotated `wallet-client.log` in the configured log directory
/// - Compact stderr output for interactive use
/// - Filter from `RUST_LOG`, falling back to [`DEFAULT_FILTER`]
/// - Panic hook that logs the panic location and message
///
/// Keep the returned guard alive for the life of the program; dropping it
/// flushes and stops the file writer. If the log directory cannot be
/// created only stderr logging is installed and `None` is returned.
pub fn init(config: &ClientConfig) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    if let Err(e) = fs::create_dir_all(&config.log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer())
            .init();
        setup_panic_hook();
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "wallet-client.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer(non_blocking))
        .with(stderr_layer())
        .init();

    tracing::info!(
        log_dir = %config.log_dir.display(),
        base_url = %config.base_url,
        "Logging initialized"
    );

    setup_panic_hook();
    Some(guard)
}

/// Detailed plain-text lines for the rolling log file.
fn file_layer<S>(writer: NonBlocking) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
}

/// Compact stderr output. Built per subscriber stack since a layer is typed by the stack it sits on.
fn stderr_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
}

/// Log panics with their location before handing off to the default hook.
fn setup_panic_hook() {
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown location".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic message".to_string()
        };

        tracing::error!(
            location = %location,
            message = %message,
            "Application panic"
        );

        default_panic(panic_info);
    }));
}
