//! Configuration management
//!
//! This module handles loading and parsing configuration for the inkstream
//! blog system. Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Session configuration
    #[serde(default)]
    pub session: SessionConfig,
    /// SSR front server configuration
    #[serde(default)]
    pub front: FrontConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin (for cookie-based sessions)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
    /// Maximum request body size in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
            body_limit: default_body_limit(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_body_limit() -> usize {
    1024 * 1024 // 1MB, the classic body-parser ceiling
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path (or ":memory:")
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/inkstream.db".to_string()
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Cookie name carrying the session key
    #[serde(default = "default_session_cookie")]
    pub cookie_name: String,
    /// Session lifetime in seconds
    #[serde(default = "default_session_ttl")]
    pub ttl_seconds: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_session_cookie(),
            ttl_seconds: default_session_ttl(),
        }
    }
}

fn default_session_cookie() -> String {
    "inkstream.sid".to_string()
}

fn default_session_ttl() -> i64 {
    86400
}

/// Serving mode for the front server.
///
/// Replaces the original NODE_ENV switch: `production` reads the render
/// bundle once at startup, `development` rebuilds it on file changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FrontMode {
    /// Build the render context once at startup
    #[default]
    Production,
    /// Watch the bundle and shell for changes, rebuild on modification
    Development,
}

/// SSR front server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on (the original front listened on 5050)
    #[serde(default = "default_front_port")]
    pub port: u16,
    /// Production or development asset-serving mode
    #[serde(default)]
    pub mode: FrontMode,
    /// Directory holding the Tera render bundle
    #[serde(default = "default_bundle_dir")]
    pub bundle_dir: PathBuf,
    /// Path to the HTML shell template
    #[serde(default = "default_shell_path")]
    pub shell_path: PathBuf,
    /// Directory of built assets served under /dist
    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,
    /// Directory of public assets served under /public
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
}

impl Default for FrontConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_front_port(),
            mode: FrontMode::default(),
            bundle_dir: default_bundle_dir(),
            shell_path: default_shell_path(),
            dist_dir: default_dist_dir(),
            public_dir: default_public_dir(),
        }
    }
}

fn default_front_port() -> u16 {
    5050
}

fn default_bundle_dir() -> PathBuf {
    PathBuf::from("templates/app")
}

fn default_shell_path() -> PathBuf {
    PathBuf::from("templates/index.html")
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
}

impl Config {
    /// Load configuration from file.
    ///
    /// If the file doesn't exist or is empty, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with the
    /// parse location.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides.
    ///
    /// Environment variables follow the pattern:
    /// - INKSTREAM_SERVER_HOST / INKSTREAM_SERVER_PORT / INKSTREAM_SERVER_CORS_ORIGIN
    /// - INKSTREAM_DATABASE_URL
    /// - INKSTREAM_SESSION_TTL_SECONDS
    /// - INKSTREAM_FRONT_PORT / INKSTREAM_FRONT_MODE
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("INKSTREAM_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("INKSTREAM_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("INKSTREAM_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }

        if let Ok(url) = std::env::var("INKSTREAM_DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(ttl) = std::env::var("INKSTREAM_SESSION_TTL_SECONDS") {
            if let Ok(ttl) = ttl.parse::<i64>() {
                self.session.ttl_seconds = ttl;
            }
        }

        if let Ok(port) = std::env::var("INKSTREAM_FRONT_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.front.port = port;
            }
        }
        if let Ok(mode) = std::env::var("INKSTREAM_FRONT_MODE") {
            match mode.to_lowercase().as_str() {
                "production" => self.front.mode = FrontMode::Production,
                "development" => self.front.mode = FrontMode::Development,
                _ => {} // Ignore invalid values
            }
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for all config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
