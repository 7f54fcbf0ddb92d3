/*!
 * Logging Module
 * Centralized logging configuration and utilities
 */
pub mod middleware;

use std::io;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::AppConfig;

/// Default filter directive for the given base level.
fn default_directives(log_level: &str) -> String {
    format!("cms_backend={},tower_http=debug,axum=debug,mongodb=warn", log_level)
}

fn log_dir() -> String {
    std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string())
}

/// Initialize the logging system.
///
/// The returned guards flush the background writers when dropped and must
/// be kept alive for as long as the process logs.
pub fn init(config: &AppConfig) -> Vec<WorkerGuard> {
    init_in(config, &log_dir())
}

fn init_in(config: &AppConfig, dir: &str) -> Vec<WorkerGuard> {
    let is_production = config.is_production();

    // Create log directory if it doesn't exist
    std::fs::create_dir_all(dir).ok();

    // File appender for all logs
    let file_appender = rolling::daily(dir, "app.log");
    let (file_writer, file_guard) = non_blocking(file_appender);

    // File appender for errors only
    let error_appender = rolling::daily(dir, "error.log");
    let (error_writer, error_guard) = non_blocking(error_appender);

    // Console writer
    let (console_writer, console_guard) = non_blocking(io::stdout());

    // Configure log level
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| {
        if is_production {
            "info".to_string()
        } else {
            "debug".to_string()
        }
    });

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&log_level)));

    // Errors go to their own JSON file in every environment
    let error_layer = fmt::layer()
        .json()
        .with_writer(error_writer)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(tracing_subscriber::filter::LevelFilter::ERROR);

    // Build the subscriber
    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(error_layer);

    let result = if is_production {
        // JSON format for production
        let file_layer = fmt::layer()
            .json()
            .with_writer(file_writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true);

        let console_layer = fmt::layer()
            .json()
            .with_writer(console_writer)
            .with_target(false);

        subscriber.with(file_layer).with(console_layer).try_init()
    } else {
        // Pretty format for development
        let file_layer = fmt::layer()
            .with_writer(file_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false);

        let console_layer = fmt::layer()
            .with_writer(console_writer)
            .with_target(true)
            .pretty();

        subscriber.with(file_layer).with(console_layer).try_init()
    };

    match result {
        Ok(()) => tracing::info!(
            environment = %config.environment,
            log_dir = %dir,
            "Logging initialized"
        ),
        Err(e) => eprintln!("Logging already initialized: {}", e),
    }

    vec![file_guard, error_guard, console_guard]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_target_this_crate() {
        let directives = default_directives("warn");
        assert!(directives.starts_with("cms_backend=warn"));
        assert!(EnvFilter::try_new(directives).is_ok());
    }

    #[test]
    fn test_init_in_both_environments() {
        let dir = tempfile::tempdir().unwrap();
        let dir = dir.path().to_str().unwrap();

        let production = AppConfig {
            environment: "production".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(init_in(&production, dir).len(), 3);

        // The global subscriber is already set; a second init only reports it.
        assert_eq!(init_in(&AppConfig::default(), dir).len(), 3);
        assert!(std::path::Path::new(dir).is_dir());
    }
}
