//! Structured logging for the Nebula viewport.
//!
//! Installs a `tracing` subscriber with console output, an optional JSON log
//! file in debug builds, and a filter taken from `RUST_LOG` or the config's
//! `debug.log_level`.

use nebula_config::Config;
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config names a level.
pub const DEFAULT_FILTER: &str = "info,wgpu=warn,naga=warn";

/// Resolve the filter directive string for the given config.
///
/// An empty `debug.log_level` falls back to [`DEFAULT_FILTER`].
pub fn filter_directives(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.is_empty() => {
            // GPU crates stay at warn unless the config names them explicitly.
            if config.debug.log_level.contains("wgpu") {
                config.debug.log_level.clone()
            } else {
                format!("{},wgpu=warn,naga=warn", config.debug.log_level)
            }
        }
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Initialize the tracing subscriber.
///
/// * `log_dir` - directory for the JSON log file (only used when `debug_build`)
/// * `debug_build` - enables the file layer
/// * `config` - supplies `debug.log_level`
///
/// `RUST_LOG` always wins over the config. Calling this twice is harmless:
/// the second installation attempt is ignored.
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let filter_str = filter_directives(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join("viewport.log"))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        let _ = subscriber.with(file_layer).try_init();
        return;
    }

    let _ = subscriber.try_init();
}

/// `EnvFilter` built from [`DEFAULT_FILTER`].
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level() {
        let filter_str = format!("{}", default_env_filter());
        assert!(filter_str.contains("wgpu=warn"));
        assert!(filter_str.contains("naga=warn"));
        assert!(filter_str.contains("info"));
    }

    #[test]
    fn test_filter_without_config_is_default() {
        assert_eq!(filter_directives(None), DEFAULT_FILTER);
    }

    #[test]
    fn test_filter_from_config_level() {
        let mut config = Config::default();
        config.debug.log_level = "debug,nebula_viewport=trace".to_string();
        let directives = filter_directives(Some(&config));
        assert!(directives.starts_with("debug,nebula_viewport=trace"));
        assert!(directives.contains("wgpu=warn"));
    }

    #[test]
    fn test_filter_respects_explicit_wgpu_level() {
        let mut config = Config::default();
        config.debug.log_level = "info,wgpu=debug".to_string();
        assert_eq!(filter_directives(Some(&config)), "info,wgpu=debug");
    }

    #[test]
    fn test_empty_config_level_uses_default() {
        let mut config = Config::default();
        config.debug.log_level.clear();
        assert_eq!(filter_directives(Some(&config)), DEFAULT_FILTER);
    }

    #[test]
    fn test_env_filter_parsing() {
        let valid_filters = [
            "info",
            "debug,nebula_render=trace",
            "warn,nebula_viewport=debug",
            "error",
        ];
        for filter_str in &valid_filters {
            let result = EnvFilter::try_from(*filter_str);
            assert!(result.is_ok(), "Failed to parse filter: {}", filter_str);
        }
    }

    #[test]
    fn test_init_logging_twice_does_not_panic() {
        let temp_dir = tempfile::tempdir().unwrap();
        init_logging(Some(temp_dir.path()), true, None);
        init_logging(None, false, None);
    }
}
