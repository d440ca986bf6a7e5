//! Logging setup on the `tracing` ecosystem.
//!
//! Logs always go to stderr; stdout carries the JSON reports.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber.
///
/// `level` is the default filter directive (e.g. "info"); `RUST_LOG`
/// overrides it when set.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize from the `[logging]` section. CLI flags win over the file.
pub fn init_from_config(config: &carlot_core::Config, verbose: bool, json_logs: bool) {
    let (level, json_format) = resolve(config, verbose, json_logs);
    init(&level, json_format);
}

/// Effective (level, json) settings for a config plus CLI overrides.
fn resolve(config: &carlot_core::Config, verbose: bool, json_logs: bool) -> (String, bool) {
    let configured = config.logging.level.to_lowercase();
    let level = if verbose && configured != "trace" {
        "debug".to_string()
    } else {
        configured
    };
    let json_format = json_logs || config.logging.format.eq_ignore_ascii_case("json");
    (level, json_format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_info_and_pretty() {
        let config = carlot_core::Config::default();
        assert_eq!(resolve(&config, false, false), ("info".to_string(), false));
    }

    #[test]
    fn test_config_sets_level_and_json() {
        let mut config = carlot_core::Config::default();
        config.logging.level = "WARN".to_string();
        config.logging.format = "json".to_string();
        assert_eq!(resolve(&config, false, false), ("warn".to_string(), true));
    }

    #[test]
    fn test_verbose_flag_raises_to_debug() {
        let config = carlot_core::Config::default();
        assert_eq!(resolve(&config, true, true), ("debug".to_string(), true));

        let mut config = carlot_core::Config::default();
        config.logging.level = "trace".to_string();
        assert_eq!(resolve(&config, true, false).0, "trace");
    }
}
