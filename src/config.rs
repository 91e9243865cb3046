use std::env;
use std::str::FromStr;

use chrono_tz::Tz;
use dotenvy::dotenv;
use strum_macros::{AsRefStr, EnumString};
use tracing::Level;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StorageBackend {
    Mysql,
    Memory,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub employee_token_ttl: usize,
    pub admin_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    /// Day boundaries for attendance records are taken in this zone.
    pub timezone: Tz,
    /// Lets clients pass their own timestamp; diagnostics only.
    pub allow_time_override: bool,

    pub admin_username: String,
    pub admin_password: String,

    pub log_dir: String,
    pub log_level: Level,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_source(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests never touch the process env.
    pub fn from_source(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &str| get(key).ok_or_else(|| ConfigError::MissingVar(key.to_string()));
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let storage_backend: StorageBackend = parse(&or_default("STORAGE_BACKEND", "mysql"), "STORAGE_BACKEND")?;
        let database_url = match storage_backend {
            StorageBackend::Mysql => Some(required("DATABASE_URL")?),
            StorageBackend::Memory => get("DATABASE_URL"),
        };

        Ok(Self {
            server_addr: or_default("SERVER_ADDR", "0.0.0.0:5000"),
            storage_backend,
            database_url,
            jwt_secret: required("JWT_SECRET")?,
            employee_token_ttl: parse(&or_default("EMPLOYEE_TOKEN_TTL", "36000"), "EMPLOYEE_TOKEN_TTL")?, // 10 h
            admin_token_ttl: parse(&or_default("ADMIN_TOKEN_TTL", "28800"), "ADMIN_TOKEN_TTL")?, // 8 h

            rate_login_per_min: parse(&or_default("RATE_LOGIN_PER_MIN", "60"), "RATE_LOGIN_PER_MIN")?,
            rate_protected_per_min: parse(
                &or_default("RATE_PROTECTED_PER_MIN", "1000"),
                "RATE_PROTECTED_PER_MIN",
            )?,

            api_prefix: or_default("API_PREFIX", "/api"),

            timezone: parse(&or_default("ATTENDANCE_TIMEZONE", "Europe/Madrid"), "ATTENDANCE_TIMEZONE")?,
            allow_time_override: parse(&or_default("ALLOW_TIME_OVERRIDE", "false"), "ALLOW_TIME_OVERRIDE")?,

            admin_username: or_default("ADMIN_USERNAME", "admin"),
            admin_password: required("ADMIN_PASSWORD")?,

            log_dir: or_default("LOG_DIR", "logs"),
            log_level: parse(&or_default("LOG_LEVEL", "DEBUG"), "LOG_LEVEL")?,
        })
    }

    /// Config for tests: in-memory backend and a throwaway secret.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        use std::collections::HashMap;

        let vars: HashMap<&str, &str> = HashMap::from([
            ("STORAGE_BACKEND", "memory"),
            ("JWT_SECRET", "test-secret"),
            ("ADMIN_PASSWORD", "test-admin-password"),
        ]);
        Self::from_source(|key| vars.get(key).map(|v| v.to_string()))
            .expect("test config is complete")
    }
}

fn parse<T>(raw: &str, key: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_source(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = from_map(&[
            ("DATABASE_URL", "mysql://root@localhost/attendance"),
            ("JWT_SECRET", "s3cret"),
            ("ADMIN_PASSWORD", "pw"),
        ])
        .unwrap();

        assert_eq!(config.storage_backend, StorageBackend::Mysql);
        assert_eq!(config.server_addr, "0.0.0.0:5000");
        assert_eq!(config.employee_token_ttl, 36000);
        assert_eq!(config.admin_token_ttl, 28800);
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.timezone, chrono_tz::Europe::Madrid);
        assert!(!config.allow_time_override);
        assert_eq!(config.admin_username, "admin");
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn mysql_backend_needs_database_url() {
        let err = from_map(&[("JWT_SECRET", "s3cret"), ("ADMIN_PASSWORD", "pw")]).unwrap_err();
        assert_eq!(err, ConfigError::MissingVar("DATABASE_URL".to_string()));
    }

    #[test]
    fn memory_backend_runs_without_database() {
        let config = from_map(&[
            ("STORAGE_BACKEND", "Memory"),
            ("JWT_SECRET", "s3cret"),
            ("ADMIN_PASSWORD", "pw"),
        ])
        .unwrap();
        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = from_map(&[
            ("STORAGE_BACKEND", "memory"),
            ("JWT_SECRET", "s3cret"),
            ("ADMIN_PASSWORD", "pw"),
            ("ATTENDANCE_TIMEZONE", "Mars/Olympus"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(key, _) if key == "ATTENDANCE_TIMEZONE"));

        let err = from_map(&[
            ("STORAGE_BACKEND", "memory"),
            ("JWT_SECRET", "s3cret"),
            ("ADMIN_PASSWORD", "pw"),
            ("ALLOW_TIME_OVERRIDE", "sometimes"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(key, _) if key == "ALLOW_TIME_OVERRIDE"));
    }
}
