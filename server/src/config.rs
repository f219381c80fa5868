//! Environment-driven server configuration.

use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://todo.db";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CORS_ORIGINS: [&str; 2] = [
    "http://localhost:3000",
    "https://todo-list-fe-p3q9.onrender.com",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: `{value}`")]
    InvalidValue { name: &'static str, value: String },
}

/// Settings read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_allowed_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            log_json: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source. Unset or blank
    /// variables fall back to the local defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(host) = get("HOST") {
            config.host = host;
        }
        if let Some(port) = get("PORT") {
            config.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                value: port.clone(),
            })?;
        }
        if let Some(origins) = get("CORS_ALLOWED_ORIGINS") {
            config.cors_allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(flag) = get("LOG_JSON") {
            config.log_json = parse_bool(&flag).ok_or(ConfigError::InvalidValue {
                name: "LOG_JSON",
                value: flag.clone(),
            })?;
        }
        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.cors_allowed_origins.len(), 2);
    }

    #[test]
    fn env_overrides_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "memory://"),
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test, http://b.test,"),
            ("LOG_JSON", "yes"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "memory://");
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.cors_allowed_origins, vec!["http://a.test", "http://b.test"]);
        assert!(config.log_json);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[("PORT", " "), ("DATABASE_URL", "")])).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
    }

    #[test]
    fn invalid_port_is_an_error() {
        let err = ServerConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                name: "PORT",
                value: "eighty".to_string()
            }
        );
    }

    #[test]
    fn invalid_log_flag_is_an_error() {
        assert!(ServerConfig::from_lookup(lookup(&[("LOG_JSON", "maybe")])).is_err());
    }
}
