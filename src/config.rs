use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::NaiveTime;

use crate::scheduling::SchedulingRules;

/// Application-level constants
pub const APP_NAME: &str = "Carebook";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_BIND: &str = "127.0.0.1:8080";

const ENV_BIND: &str = "CAREBOOK_BIND";
const ENV_DB: &str = "CAREBOOK_DB";
const ENV_MAX_DAILY: &str = "CAREBOOK_MAX_DAILY_PER_DOCTOR";
const ENV_OPENS: &str = "CAREBOOK_OPENING_TIME";
const ENV_CLOSES: &str = "CAREBOOK_CLOSING_TIME";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,carebook_lib=debug,carebook=debug"
}

/// Get the application data directory (~/Carebook/)
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_NAME)
}

/// Default location of the SQLite database file.
pub fn default_database_path() -> PathBuf {
    app_data_dir().join("carebook.db")
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: invalid value {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Server settings, resolved from `CAREBOOK_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub database_path: PathBuf,
    pub rules: SchedulingRules,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_raw = lookup(ENV_BIND).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| invalid(ENV_BIND, &bind_raw, e))?;

        let database_path = lookup(ENV_DB)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let mut rules = SchedulingRules::default();
        if let Some(raw) = lookup(ENV_MAX_DAILY) {
            rules.max_daily_per_doctor = match raw.trim().parse::<usize>() {
                Ok(0) => return Err(invalid(ENV_MAX_DAILY, &raw, "must be at least 1")),
                Ok(n) => n,
                Err(e) => return Err(invalid(ENV_MAX_DAILY, &raw, e)),
            };
        }
        if let Some(raw) = lookup(ENV_OPENS) {
            rules.opens_at = parse_clock(ENV_OPENS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_CLOSES) {
            rules.closes_at = parse_clock(ENV_CLOSES, &raw)?;
        }
        if rules.opens_at > rules.closes_at {
            return Err(invalid(
                ENV_CLOSES,
                &rules.closes_at.format("%H:%M").to_string(),
                "closing time precedes opening time",
            ));
        }

        Ok(Self {
            bind,
            database_path,
            rules,
        })
    }
}

fn parse_clock(var: &'static str, raw: &str) -> Result<NaiveTime, ConfigError> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|e| invalid(var, raw, e))
}

fn invalid(var: &'static str, value: &str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
