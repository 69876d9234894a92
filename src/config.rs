//! Configuration types, built from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::ConfigError;

/// Default API base URL used by the client when `PMAGENT_API_BASE` is unset.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Document Store server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub db_path: PathBuf,
    /// Origins allowed by the CORS layer.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8000,
            db_path: PathBuf::from("./pmagent_data/pmagent.db"),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl ServerConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind = std::env::var("PMAGENT_BIND").unwrap_or(defaults.bind);

        let port: u16 = std::env::var("PMAGENT_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let db_path = std::env::var("PMAGENT_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let cors_origins = match std::env::var("PMAGENT_CORS_ORIGINS") {
            Ok(raw) => split_csv(&raw),
            Err(_) => defaults.cors_origins,
        };

        Self {
            bind,
            port,
            db_path,
            cors_origins,
        }
    }

    /// Socket address to listen on.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind, self.port)
            .parse()
            .map_err(|e| ConfigError::InvalidValue {
                key: "PMAGENT_BIND".to_string(),
                message: format!("{e}"),
            })
    }
}

/// Client-side configuration: the API host and where the wizard logs go.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base: String,
    pub log_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            log_dir: PathBuf::from("./pmagent_data/logs"),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let api_base = std::env::var("PMAGENT_API_BASE")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.api_base);
        let log_dir = std::env::var("PMAGENT_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.log_dir);
        Self { api_base, log_dir }
    }
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
