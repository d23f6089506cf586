use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub pagination: PaginationSettings,
    pub logging: LoggingSettings,
}

/// Where the HTTP API listens and how long a request may run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Requests running longer than this are aborted and their writes rolled back.
    pub request_timeout_secs: u64,
}

impl ServerSettings {
    pub fn addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::ValidationError(format!("invalid server address: {e}")))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Which store backs the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Backend {
    /// PostgreSQL through a connection pool.
    Postgres,
    /// A process-local store, emptied on restart.
    Memory,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Postgres => "postgres",
            Backend::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    pub backend: Backend,
    /// Falls back to the `DATABASE_URL` environment variable when unset.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Apply the embedded migrations on startup.
    pub run_migrations: bool,
}

impl StorageSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

/// Page sizes used when a collection request does not say, and the most it may ask for.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaginationSettings {
    pub default_page_size: u64,
    pub max_page_size: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive. `RUST_LOG` takes precedence when set.
    pub filter: String,
    /// When set, logs are also written to daily rolling files in this directory.
    pub directory: Option<String>,
    pub file_prefix: String,
}

impl Settings {
    /// Checks the invariants the deserializer cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pagination = &self.pagination;
        if pagination.default_page_size == 0 || pagination.max_page_size == 0 {
            return Err(ConfigError::ValidationError(
                "page sizes must be greater than 0".to_string(),
            ));
        }
        if pagination.default_page_size > pagination.max_page_size {
            return Err(ConfigError::ValidationError(format!(
                "default_page_size ({}) must not exceed max_page_size ({})",
                pagination.default_page_size, pagination.max_page_size
            )));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.storage.backend == Backend::Postgres {
            let url = self.storage.database_url.as_deref().unwrap_or_default();
            if url.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "the postgres backend needs storage.database_url or DATABASE_URL".to_string(),
                ));
            }
            if self.storage.max_connections == 0 {
                return Err(ConfigError::ValidationError(
                    "max_connections must be greater than 0".to_string(),
                ));
            }
        }
        Ok(())
    }
}
