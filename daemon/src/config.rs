//! Daemon configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use acp_utils::LogFormat;

use crate::error::ConfigError;

/// Configuration for the daemon.
///
/// Loaded from a TOML file via [`AppConfig::from_toml_file`]; every field has
/// a default so an empty file is valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// LMDB map size in MiB.
    #[serde(default = "default_map_size_mb")]
    pub map_size_mb: usize,

    /// Bearer token for `/api/admin`. Admin routes answer 401 when unset.
    #[serde(default)]
    pub admin_token: Option<String>,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Prefix of the placeholder locations recorded for uploaded images.
    #[serde(default = "default_upload_prefix")]
    pub upload_prefix: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./acp_data")
}

fn default_listen_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_map_size_mb() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_upload_prefix() -> String {
    "/uploads".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .listen_addr
            .parse()
            .map_err(|_| ConfigError::ListenAddr(self.listen_addr.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn map_size_bytes(&self) -> usize {
        self.map_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            listen_addr: default_listen_addr(),
            port: default_port(),
            map_size_mb: default_map_size_mb(),
            admin_token: None,
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            enable_cors: default_true(),
            upload_prefix: default_upload_prefix(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = AppConfig {
            admin_token: Some("tok".into()),
            ..Default::default()
        };
        let toml_str = config.to_toml_string().unwrap();
        let parsed = AppConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = AppConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.port, 3000);
        assert_eq!(config.map_size_mb, 256);
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(config.upload_prefix, "/uploads");
        assert!(config.enable_cors);
        assert!(config.admin_token.is_none());
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            port = 8080
            log_format = "json"
            admin_token = "hunter2"
        "#;
        let config = AppConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.admin_token.as_deref(), Some("hunter2"));
        assert_eq!(config.log_level, "info"); // default
    }

    #[test]
    fn socket_addr_combines_listen_addr_and_port() {
        let config = AppConfig {
            listen_addr: "127.0.0.1".into(),
            port: 4000,
            ..Default::default()
        };
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:4000");
        let bad = AppConfig {
            listen_addr: "localhost:80".into(),
            ..Default::default()
        };
        assert!(matches!(bad.socket_addr(), Err(ConfigError::ListenAddr(_))));
    }

    #[test]
    fn missing_file_returns_config_error() {
        let err = AppConfig::from_toml_file(Path::new("/nonexistent/acp.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
