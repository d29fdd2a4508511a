//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use crate::config::schema::HarnessConfig;
use crate::config::validation::ValidationError;

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse a TOML file into a configuration without validating it.
///
/// Validation runs once the environment and CLI overrides are applied
/// (see `lifecycle::startup`).
pub fn read_config(path: &Path) -> Result<HarnessConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Overlay environment variables on top of `config`.
///
/// Numeric variables that are missing, unparseable, zero or negative leave
/// the current value untouched. Empty strings are ignored as well.
pub fn apply_env<F>(config: &mut HarnessConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let number = |key: &str| {
        lookup(key)
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
    };
    let millis = |key: &str| number(key).map(|v| v as u64).filter(|v| *v > 0);
    let text = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = millis("PING_INTERVAL") {
        config.probe.interval_ms = v;
    }
    if let Some(v) = millis("SERVER_TIMEOUT") {
        config.delivery.server_timeout_ms = v;
    }
    if let Some(v) = millis("MIN_RETRY_TIME") {
        config.delivery.min_retry_ms = v;
    }
    if let Some(v) = millis("MAX_RETRY_TIME") {
        config.delivery.max_retry_ms = v;
    }
    if let Some(v) = number("RETRY_EXP") {
        config.delivery.retry_exp = v;
    }
    if let Some(v) = text("CHECK_URL") {
        config.probe.check_url = v;
    }
    if let Some(v) = text("COLLECTOR_URL") {
        config.delivery.collector_url = v;
    }
    if let Some(v) = text("COLLECTOR_ADDR") {
        config.collector.bind_address = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let mut config = HarnessConfig::default();
        apply_env(
            &mut config,
            env(&[
                ("PING_INTERVAL", "2500"),
                ("RETRY_EXP", "1.5"),
                ("CHECK_URL", "http://localhost:3000/"),
            ]),
        );

        assert_eq!(config.probe.interval_ms, 2500);
        assert_eq!(config.delivery.retry_exp, 1.5);
        assert_eq!(config.probe.check_url, "http://localhost:3000/");
        assert_eq!(config.delivery.min_retry_ms, 100);
    }

    #[test]
    fn test_unusable_values_keep_defaults() {
        let mut config = HarnessConfig::default();
        apply_env(
            &mut config,
            env(&[
                ("PING_INTERVAL", "0"),
                ("SERVER_TIMEOUT", "soon"),
                ("MAX_RETRY_TIME", "-5"),
                ("CHECK_URL", ""),
            ]),
        );

        assert_eq!(config.probe.interval_ms, 10_000);
        assert_eq!(config.delivery.server_timeout_ms, 10_000);
        assert_eq!(config.delivery.max_retry_ms, 60_000);
        assert_eq!(config.probe.check_url, "https://fundraiseup.com/");
    }

    #[test]
    fn test_toml_sections_are_optional() {
        let config: HarnessConfig = toml::from_str(
            r#"
            [delivery]
            max_retry_ms = 5000

            [collector]
            median = "exact"
            "#,
        )
        .unwrap();

        assert_eq!(config.delivery.max_retry_ms, 5000);
        assert_eq!(config.delivery.min_retry_ms, 100);
        assert_eq!(config.collector.median, crate::config::MedianMode::Exact);
        assert_eq!(config.probe.interval_ms, 10_000);
    }
}
