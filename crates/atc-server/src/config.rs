//! Server configuration from environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use atc_core::rules::DEFAULT_FINE_STEP_SEC;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// Sampling step used when a request does not name one
    pub sample_step_secs: i64,
    pub max_upload_bytes: usize,
    pub cache_max_entries: usize,
    pub cache_ttl: Duration,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            sample_step_secs: DEFAULT_FINE_STEP_SEC,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cache_max_entries: 64,
            cache_ttl: Duration::from_secs(1800),
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_parse("ATC_PORT").unwrap_or(defaults.server_port),
            sample_step_secs: env_parse("ATC_SAMPLE_STEP_SECS")
                .filter(|step: &i64| *step > 0)
                .unwrap_or(defaults.sample_step_secs),
            max_upload_bytes: env_parse("ATC_MAX_UPLOAD_BYTES")
                .unwrap_or(defaults.max_upload_bytes),
            cache_max_entries: env_parse("ATC_CACHE_MAX_ENTRIES")
                .unwrap_or(defaults.cache_max_entries),
            cache_ttl: env_parse("ATC_CACHE_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            log_format: match env::var("ATC_LOG_FORMAT").as_deref() {
                Ok(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.trim().parse().ok())
}
