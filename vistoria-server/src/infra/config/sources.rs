use serde::{Deserialize, Serialize};
use std::{path::PathBuf, str::FromStr};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
    #[serde(default)]
    pub catalog: FileCatalogConfig,
    #[serde(default)]
    pub identity: FileIdentityConfig,
    pub dev_mode: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_methods: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_headers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_credentials: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCatalogConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_page_size: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileIdentityConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_header: Option<String>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub database_url: Option<String>,
    pub database_max_connections: Option<u32>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub cors_allowed_methods: Option<Vec<String>>,
    pub cors_allowed_headers: Option<Vec<String>>,
    pub cors_allow_credentials: Option<bool>,
    pub catalog_default_page_size: Option<u32>,
    pub catalog_max_page_size: Option<u32>,
    pub identity_subject_header: Option<String>,
    pub dev_mode: Option<bool>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let csv = |name: &str| lookup(name).map(|raw| parse_csv(&raw));
        let flag = |name: &str| lookup(name).and_then(|raw| parse_bool(&raw));

        Self {
            config_path: lookup("VISTORIA_CONFIG").map(PathBuf::from),
            server_host: lookup("SERVER_HOST"),
            server_port: parse_var(&lookup, "SERVER_PORT"),
            database_url: lookup("DATABASE_URL"),
            database_max_connections: parse_var(&lookup, "DATABASE_MAX_CONNECTIONS"),
            cors_allowed_origins: csv("CORS_ALLOWED_ORIGINS"),
            cors_allowed_methods: csv("CORS_ALLOWED_METHODS"),
            cors_allowed_headers: csv("CORS_ALLOWED_HEADERS"),
            cors_allow_credentials: flag("CORS_ALLOW_CREDENTIALS"),
            catalog_default_page_size: parse_var(&lookup, "CATALOG_DEFAULT_PAGE_SIZE"),
            catalog_max_page_size: parse_var(&lookup, "CATALOG_MAX_PAGE_SIZE"),
            identity_subject_header: lookup("IDENTITY_SUBJECT_HEADER"),
            dev_mode: flag("DEV_MODE"),
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    lookup(name).and_then(|raw| raw.trim().parse().ok())
}

fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|part| {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn env_lookup_parses_typed_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SERVER_PORT", "8080"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, ,https://b.example"),
            ("DEV_MODE", "yes"),
            ("CATALOG_MAX_PAGE_SIZE", "not-a-number"),
        ]);
        let env = EnvConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(env.server_port, Some(8080));
        assert_eq!(
            env.cors_allowed_origins,
            Some(vec!["https://a.example".into(), "https://b.example".into()])
        );
        assert_eq!(env.dev_mode, Some(true));
        assert_eq!(env.catalog_max_page_size, None);
        assert!(env.database_url.is_none());
    }
}
