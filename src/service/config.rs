extern crate config as _;

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{AppError, AppResult};

pub const ENV_PREFIX: &str = "ADMINREST";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    pub url: String,
    pub timeout_ms: u64,
    /// gzip request bodies
    pub gzip: bool,
    pub user_agent: Option<String>,
    /// extra headers sent with every request
    pub headers: HashMap<String, String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            url: "http://localhost:8080".to_string(),
            timeout_ms: 30_000,
            gzip: false,
            user_agent: None,
            headers: HashMap::new(),
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthKind {
    #[default]
    None,
    Basic,
    Bearer,
    /// basic auth with the fixed user `token`
    ApiKey,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    pub kind: AuthKind,
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    pub enabled: bool,
    pub max_retries: u32,
    pub max_retry_interval_ms: u64,
    pub initial_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            enabled: false,
            max_retries: 4,
            max_retry_interval_ms: 30_000,
            initial_backoff_ms: 1_000,
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdminConfig {
    pub service: ServiceConfig,
    pub auth: AuthConfig,
    pub retry: RetryConfig,
}

impl AdminConfig {
    /// Loads a config file and layers `ADMINREST_*` environment variables
    /// over it, e.g. `ADMINREST_SERVICE__URL`.
    pub fn set_up_config<P: AsRef<Path>>(path: P) -> AppResult<AdminConfig> {
        let path_str = path
            .as_ref()
            .to_str()
            .ok_or(AppError::Validation(format!(
                "config file path: {}",
                path.as_ref().to_string_lossy()
            )))?;
        let config = config::Config::builder()
            .add_source(config::File::with_name(path_str))
            .add_source(env_source())
            .build()?;

        let admin_config: AdminConfig = config.try_deserialize()?;

        Ok(admin_config)
    }

    /// Defaults overlaid with `ADMINREST_*` environment variables only.
    pub fn from_env() -> AppResult<AdminConfig> {
        let config = config::Config::builder()
            .add_source(env_source())
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_conf(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("create temp config");
        file.write_all(contents.as_bytes()).expect("write temp config");
        file
    }

    #[test]
    fn test_defaults() {
        let config = AdminConfig::default();
        assert_eq!(config.service.url, "http://localhost:8080");
        assert_eq!(config.service.timeout(), Duration::from_secs(30));
        assert_eq!(config.auth.kind, AuthKind::None);
        assert!(!config.retry.enabled);
        assert_eq!(config.retry.max_retries, 4);
    }

    #[test]
    fn test_load_partial_file() {
        let file = write_conf(
            r#"
[service]
url = "https://admin.example.net"
gzip = true

[auth]
kind = "api_key"
api_key = "s3cr3t"

[retry]
enabled = true
max_retries = 2
"#,
        );
        let config = AdminConfig::set_up_config(file.path()).unwrap();
        assert_eq!(config.service.url, "https://admin.example.net");
        assert!(config.service.gzip);
        assert_eq!(config.service.timeout_ms, 30_000);
        assert_eq!(config.auth.kind, AuthKind::ApiKey);
        assert_eq!(config.auth.api_key.as_deref(), Some("s3cr3t"));
        assert!(config.retry.enabled);
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.retry.max_retry_interval_ms, 30_000);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = AdminConfig::set_up_config(&missing).unwrap_err();
        assert!(matches!(err, AppError::ConfigFileError(_)));
    }

    #[test]
    fn test_unknown_auth_kind_rejected() {
        let file = write_conf(
            r#"
[auth]
kind = "kerberos"
"#,
        );
        assert!(AdminConfig::set_up_config(file.path()).is_err());
    }
}
