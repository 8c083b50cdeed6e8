//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field has a default so an empty configuration
//! still yields a runnable server.

pub mod app;
pub mod local;
pub mod logging;
pub mod store;
pub mod sync;
pub mod upload;
pub mod vision;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::local::LocalConfig;
pub use self::logging::{LogFormat, LoggingConfig};
pub use self::store::{FolderDeletePolicy, StoreConfig, StoreProvider};
pub use self::sync::SyncConfig;
pub use self::upload::UploadConfig;
pub use self::vision::VisionConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// Deserialization target for the merged sources: `config/default.toml`,
/// the `config/{env}.toml` overlay, `ASSETHUB__*` variables, and finally
/// the plain `PORT` and `OPENAI_API_KEY` variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Upload validation limits.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Local single-blob library settings.
    #[serde(default)]
    pub local: LocalConfig,
    /// Hosted store selection and policies.
    #[serde(default)]
    pub store: StoreConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Client cache synchronization settings.
    #[serde(default)]
    pub sync: SyncConfig,
    /// Vision relay settings.
    #[serde(default)]
    pub vision: VisionConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    #[serde(default)]
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connection timeout in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_seconds: default_connect_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the `config/` directory and the environment.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from_dir(Path::new("config"), env)
    }

    /// Load configuration from TOML files under `dir` and the environment.
    ///
    /// Both files are optional. Environment variables prefixed with
    /// `ASSETHUB__` use `__` as the section separator.
    pub fn load_from_dir(dir: &Path, env: &str) -> Result<Self, AppError> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|raw| raw.trim().parse::<i64>().ok());
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let config = config::Config::builder()
            .add_source(config::File::from(dir.join("default")).required(false))
            .add_source(config::File::from(dir.join(env)).required(false))
            .add_source(
                config::Environment::with_prefix("ASSETHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", port)?
            .set_override_option("vision.api_key", api_key)?
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}
