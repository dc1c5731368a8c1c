use std::path::Path;

use dotenv::dotenv;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Console-only logging, filtered by `RUST_LOG` (default `info`).
pub fn setup_local_tracing() {
    dotenv().ok();
    let timer = ChronoLocal::new(TIME_FORMAT.to_string());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_timer(timer)
        .with_target(true)
        .with_thread_names(true)
        .with_line_number(true);
    // a second init from another test is fine
    let _ = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter("info"))
        .try_init();
}

/// Console plus an hourly rolling file under `log_dir`. Keep the guard alive
/// for as long as logs should be flushed.
pub fn setup_tracing<P: AsRef<Path>>(log_dir: P, default_directive: &str) -> WorkerGuard {
    dotenv().ok();
    let file_appender = tracing_appender::rolling::hourly(log_dir, "admin-demo.log");
    let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);
    let writer = non_blocking.and(std::io::stdout);

    let timer = ChronoLocal::new(TIME_FORMAT.to_string());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_timer(timer)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(writer);

    let _ = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter(default_directive))
        .try_init();

    worker_guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_tracing_installs_twice() {
        setup_local_tracing();
        setup_local_tracing();
        tracing::info!("console subscriber still active");
    }
}
