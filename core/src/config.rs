//! Client settings read from the environment.
//!
//! Every variable is optional. Empty values count as unset, and numeric
//! values are range-checked so a bad `TODO_PAGE_LIMIT` fails at startup
//! rather than as a 422 from the server.

use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::types::ListQuery;

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api/v1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a number, got {value:?}")]
    NotANumber { var: &'static str, value: String },
    #[error("{var} is out of range: {value}")]
    OutOfRange { var: &'static str, value: u64 },
    #[error("unknown log format {0:?} (expected \"json\" or \"text\")")]
    UnknownLogFormat(String),
}

/// How exported log entries are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "text" => Ok(LogFormat::Text),
            _ => Err(ConfigError::UnknownLogFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, without the `/todos` collection segment.
    pub api_url: String,
    pub page_limit: u32,
    pub log_retention: usize,
    pub log_format: LogFormat,
    /// `EnvFilter` directives; `None` falls back to `RUST_LOG` and then the
    /// built-in default.
    pub log_filter: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_limit: 10,
            log_retention: 100,
            log_format: LogFormat::Json,
            log_filter: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let page_limit = match get("TODO_PAGE_LIMIT") {
            Some(raw) => bounded("TODO_PAGE_LIMIT", &raw, 1, 100)? as u32,
            None => defaults.page_limit,
        };
        let log_retention = match get("TODO_LOG_RETENTION") {
            Some(raw) => bounded("TODO_LOG_RETENTION", &raw, 1, u32::MAX as u64)? as usize,
            None => defaults.log_retention,
        };
        let log_format = match get("TODO_LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => defaults.log_format,
        };

        Ok(Self {
            api_url: get("TODO_API_URL")
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            page_limit,
            log_retention,
            log_format,
            log_filter: get("TODO_LOG"),
        })
    }

    /// URL of the todo collection, e.g. `http://localhost:3000/api/v1/todos`.
    pub fn todos_url(&self) -> String {
        format!("{}/todos", self.api_url.trim_end_matches('/'))
    }

    pub fn list_query(&self) -> ListQuery {
        ListQuery {
            limit: self.page_limit,
            ..ListQuery::default()
        }
    }
}

fn bounded(var: &'static str, raw: &str, min: u64, max: u64) -> Result<u64, ConfigError> {
    let value: u64 = raw.trim().parse().map_err(|_| ConfigError::NotANumber {
        var,
        value: raw.to_string(),
    })?;
    if value < min || value > max {
        return Err(ConfigError::OutOfRange { var, value });
    }
    Ok(value)
}
