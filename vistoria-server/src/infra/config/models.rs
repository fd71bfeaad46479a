use std::path::PathBuf;

use serde::Serialize;
use vistoria_core::catalog::MAX_PAGE_SIZE;
use vistoria_model::DEFAULT_PAGE_SIZE;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_SUBJECT_HEADER: &str = "x-identity-subject";

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub catalog: CatalogConfig,
    pub identity: IdentityConfig,
    pub dev_mode: bool,
    #[serde(skip)]
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseConfig {
    /// Required to serve; absent only for commands that never touch the store.
    #[serde(skip)]
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
            allowed_methods: ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
                .map(String::from)
                .to_vec(),
            allowed_headers: ["Content-Type", DEFAULT_SUBJECT_HEADER]
                .map(String::from)
                .to_vec(),
            allow_credentials: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CatalogConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

/// Headers an upstream gateway uses to forward the verified caller.
#[derive(Debug, Clone, Serialize)]
pub struct IdentityConfig {
    pub subject_header: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            subject_header: DEFAULT_SUBJECT_HEADER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
