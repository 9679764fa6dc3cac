//! Structured logging for the orrery.
//!
//! Console output with uptime timestamps and module targets, plus a JSON file
//! layer in debug builds. The filter comes from `RUST_LOG` when set, otherwise
//! from the configured `debug.log_level`.

use orrery_config::Config;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config names a level.
pub const DEFAULT_FILTER: &str = "info";

/// File name of the JSON log written in debug builds.
pub const LOG_FILE_NAME: &str = "orrery.log";

/// Resolve the filter directives for a (possibly absent) config.
///
/// An empty `log_level` falls back to [`DEFAULT_FILTER`].
pub fn filter_directives(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => {
            config.debug.log_level.trim().to_string()
        }
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - directory for the JSON log file (only used when `debug_build`)
/// * `debug_build` - enables the JSON file layer
/// * `config` - source of the `log_level` fallback
///
/// Returns the path of the JSON log file when one was opened.
///
/// ```no_run
/// use orrery_config::Config;
///
/// let config = Config::default();
/// orrery_log::init_logging(None, false, Some(&config));
/// ```
pub fn init_logging(
    log_dir: Option<&Path>,
    debug_build: bool,
    config: Option<&Config>,
) -> Option<PathBuf> {
    let directives = filter_directives(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directives));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true) // loader threads are named
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
    {
        let log_path = log_dir.join(LOG_FILE_NAME);
        if let Ok(log_file) = std::fs::File::create(&log_path) {
            let file_layer = fmt::layer()
                .with_writer(log_file)
                .with_ansi(false)
                .with_target(true)
                .with_timer(fmt::time::uptime())
                .json();

            subscriber.with(file_layer).init();
            return Some(log_path);
        }
    }

    subscriber.init();
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_without_config() {
        assert_eq!(filter_directives(None), DEFAULT_FILTER);
    }

    #[test]
    fn test_config_level_is_used() {
        let mut config = Config::default();
        config.debug.log_level = "debug,orrery_assets=trace".to_string();
        let directives = filter_directives(Some(&config));
        assert_eq!(directives, "debug,orrery_assets=trace");
    }

    #[test]
    fn test_blank_config_level_falls_back() {
        let mut config = Config::default();
        config.debug.log_level = "   ".to_string();
        assert_eq!(filter_directives(Some(&config)), DEFAULT_FILTER);
    }

    #[test]
    fn test_directives_parse_as_env_filter() {
        for directives in ["info", "warn,orrery_scene=debug", "trace"] {
            let filter = EnvFilter::try_new(directives);
            assert!(filter.is_ok(), "failed to parse: {directives}");
        }
    }

    #[test]
    fn test_log_file_lands_in_log_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join(LOG_FILE_NAME);
        assert_eq!(log_path.file_name().unwrap(), "orrery.log");
        assert_eq!(log_path.parent().unwrap(), temp_dir.path());
    }
}
