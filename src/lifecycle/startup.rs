//! Startup orchestration.
//!
//! Configuration is assembled in a fixed order (defaults, file, environment,
//! CLI flags) and validated once at the end. Any startup error is fatal.

use std::path::Path;

use crate::config::loader::{apply_env, read_config, ConfigError};
use crate::config::validation::validate_config;
use crate::config::HarnessConfig;

/// Build the effective configuration for a binary.
///
/// `overrides` applies CLI flags after the environment has been read.
pub fn prepare<F>(path: Option<&Path>, overrides: F) -> Result<HarnessConfig, ConfigError>
where
    F: FnOnce(&mut HarnessConfig),
{
    prepare_with_env(path, |key| std::env::var(key).ok(), overrides)
}

/// [`prepare`] with an explicit environment lookup.
pub fn prepare_with_env<E, F>(
    path: Option<&Path>,
    env: E,
    overrides: F,
) -> Result<HarnessConfig, ConfigError>
where
    E: Fn(&str) -> Option<String>,
    F: FnOnce(&mut HarnessConfig),
{
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => HarnessConfig::default(),
    };
    apply_env(&mut config, env);
    overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_env() {
        let config = prepare_with_env(
            None,
            |key| (key == "CHECK_URL").then(|| "http://env.example/".to_string()),
            |c| c.probe.check_url = "http://cli.example/".into(),
        )
        .unwrap();
        assert_eq!(config.probe.check_url, "http://cli.example/");
    }

    #[test]
    fn test_invalid_result_is_fatal() {
        let err = prepare_with_env(None, |_| None, |c| c.delivery.retry_exp = 0.5).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = prepare_with_env(
            Some(Path::new("/definitely/not/here.toml")),
            |_| None,
            |_| {},
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_file_values_are_validated_after_env() {
        use crate::config::validation::ValidationError;

        let path = std::env::temp_dir().join(format!("uptime-pinger-{}.toml", std::process::id()));
        std::fs::write(&path, "[delivery]\nretry_exp = 1.0\nmax_retry_ms = 5000\n").unwrap();

        let rejected = prepare_with_env(Some(&path), |_| None, |_| {});
        let repaired = prepare_with_env(
            Some(&path),
            |key| (key == "RETRY_EXP").then(|| "3".to_string()),
            |_| {},
        );
        std::fs::remove_file(&path).unwrap();

        match rejected {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors, vec![ValidationError::RetryExponent(1.0)]);
            }
            other => panic!("expected validation failure, got {:?}", other.map(|_| ())),
        }
        let config = repaired.unwrap();
        assert_eq!(config.delivery.retry_exp, 3.0);
        assert_eq!(config.delivery.max_retry_ms, 5000);
    }
}
