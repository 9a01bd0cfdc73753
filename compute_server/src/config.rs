// THEORY:
// Server settings come from `CE_*` environment variables, each with a default
// that is good enough for a local run. A variable that is set but cannot be
// parsed is an error rather than a silent fallback, so a typo in a deployment
// fails at startup instead of running with the wrong limits.
//
// `from_lookup` takes the variable source as a closure; `from_env` is the thin
// wrapper over `std::env::var`. Tests feed a map and never touch the process
// environment.

use compute_engine::Limits;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 64 * 1024 * 1024;
pub const DEFAULT_MAX_BATCH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{name}={value:?} is invalid: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub workers: usize,
    pub request_timeout: Duration,
    pub body_limit_bytes: usize,
    /// Most operations accepted in one `/api/batch` request.
    pub max_batch_len: usize,
    pub limits: Limits,
    /// Suppresses the per-request log line.
    pub quiet: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND.to_string(),
            workers: num_cpus::get(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
            max_batch_len: DEFAULT_MAX_BATCH,
            limits: Limits::default(),
            quiet: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let limits = defaults.limits;

        let workers = parse_var(&lookup, "CE_WORKERS", defaults.workers)?;
        if workers == 0 {
            return Err(invalid("CE_WORKERS", "0", "at least one worker is required"));
        }
        let timeout_secs = parse_var(&lookup, "CE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(invalid("CE_TIMEOUT_SECS", "0", "timeout must be positive"));
        }

        Ok(Self {
            bind_addr: lookup("CE_BIND")
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(defaults.bind_addr),
            workers,
            request_timeout: Duration::from_secs(timeout_secs),
            body_limit_bytes: parse_var(&lookup, "CE_BODY_LIMIT_BYTES", defaults.body_limit_bytes)?,
            max_batch_len: parse_var(&lookup, "CE_MAX_BATCH", defaults.max_batch_len)?,
            limits: Limits {
                max_factorial_n: parse_var(&lookup, "CE_MAX_FACTORIAL_N", limits.max_factorial_n)?,
                max_fibonacci_n: parse_var(&lookup, "CE_MAX_FIBONACCI_N", limits.max_fibonacci_n)?,
                max_prime_limit: parse_var(&lookup, "CE_MAX_PRIME_LIMIT", limits.max_prime_limit)?,
                max_prime_check_digits: parse_var(
                    &lookup,
                    "CE_MAX_PRIME_CHECK_DIGITS",
                    limits.max_prime_check_digits,
                )?,
                max_matrix_cells: parse_var(&lookup, "CE_MAX_MATRIX_CELLS", limits.max_matrix_cells)?,
                max_sort_len: parse_var(&lookup, "CE_MAX_SORT_LEN", limits.max_sort_len)?,
                max_text_bytes: parse_var(&lookup, "CE_MAX_TEXT_BYTES", limits.max_text_bytes)?,
                max_pixels: parse_var(&lookup, "CE_MAX_PIXELS", limits.max_pixels)?,
            },
            quiet: lookup("CE_QUIET")
                .map(|value| !matches!(value.trim(), "" | "0" | "false"))
                .unwrap_or(false),
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|error: T::Err| invalid(name, &value, &error.to_string())),
    }
}

fn invalid(name: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:5000");
        assert_eq!(config.workers, num_cpus::get());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.body_limit_bytes, 64 * 1024 * 1024);
        assert_eq!(config.max_batch_len, 64);
        assert_eq!(config.limits, Limits::default());
        assert!(!config.quiet);
    }

    #[test]
    fn reads_every_variable() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("CE_BIND", "0.0.0.0:8080"),
            ("CE_WORKERS", "3"),
            ("CE_TIMEOUT_SECS", "5"),
            ("CE_BODY_LIMIT_BYTES", "1024"),
            ("CE_MAX_BATCH", "8"),
            ("CE_MAX_FACTORIAL_N", "10"),
            ("CE_MAX_PRIME_CHECK_DIGITS", " 12 "),
            ("CE_MAX_PIXELS", "100"),
            ("CE_QUIET", "1"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.workers, 3);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.body_limit_bytes, 1024);
        assert_eq!(config.max_batch_len, 8);
        assert_eq!(config.limits.max_factorial_n, 10);
        assert_eq!(config.limits.max_prime_check_digits, 12);
        assert_eq!(config.limits.max_pixels, 100);
        assert_eq!(config.limits.max_sort_len, Limits::default().max_sort_len);
        assert!(config.quiet);
    }

    #[test]
    fn malformed_values_are_errors() {
        let error = ServerConfig::from_lookup(lookup_from(&[("CE_TIMEOUT_SECS", "soon")])).unwrap_err();
        let ConfigError::Invalid { name, value, .. } = error;
        assert_eq!(name, "CE_TIMEOUT_SECS");
        assert_eq!(value, "soon");

        assert!(ServerConfig::from_lookup(lookup_from(&[("CE_WORKERS", "0")])).is_err());
        assert!(ServerConfig::from_lookup(lookup_from(&[("CE_MAX_PIXELS", "-1")])).is_err());
    }

    #[test]
    fn quiet_accepts_falsy_spellings() {
        for value in ["0", "false", ""] {
            let config = ServerConfig::from_lookup(lookup_from(&[("CE_QUIET", value)])).unwrap();
            assert!(!config.quiet, "CE_QUIET={:?}", value);
        }
    }
}
