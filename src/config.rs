//! TOML configuration with environment overrides.
//!
//! Every section is optional; a missing section takes its defaults, so an
//! empty file (or no file at all, see [`load_config_or_default`]) yields a
//! working development setup. After parsing, a handful of environment
//! variables override file values:
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `PORT` | Replaces the port of `server.bind` |
//! | `APP_ENV` | Replaces `server.environment` |
//! | `FRONTEND_URL` | Appended to `cors.allowed_origins` |
//! | `DYNAFORM_API_URL` | Replaces `client.api_url` |

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub form: FormConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Reported by `GET /health`.
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            environment: default_environment(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}
fn default_environment() -> String {
    "development".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    /// Mirror any request origin instead of checking `allowed_origins`.
    #[serde(default = "default_permissive")]
    pub permissive: bool,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            permissive: default_permissive(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

fn default_permissive() -> bool {
    true
}
fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:3000".to_string(),
    ]
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaginationConfig {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_limit() -> usize {
    10
}
fn default_max_limit() -> usize {
    100
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct FormConfig {
    /// JSON schema file to serve. The built-in onboarding form when unset.
    #[serde(default)]
    pub schema_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    /// Base URL of the API, including the `/api` prefix.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:3000/api".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

impl Config {
    /// All defaults, no file.
    pub fn minimal() -> Self {
        Self::default()
    }

    /// Applies environment overrides, reading variables through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT").filter(|p| !p.is_empty()) {
            let port: u16 = port
                .parse()
                .with_context(|| format!("PORT must be a port number, got '{}'", port))?;
            let mut addr = self.bind_addr()?;
            addr.set_port(port);
            self.server.bind = addr.to_string();
        }

        if let Some(env) = lookup("APP_ENV").filter(|e| !e.is_empty()) {
            self.server.environment = env;
        }

        if let Some(origin) = lookup("FRONTEND_URL").filter(|o| !o.is_empty()) {
            if !self.cors.allowed_origins.contains(&origin) {
                self.cors.allowed_origins.push(origin);
            }
        }

        if let Some(url) = lookup("DYNAFORM_API_URL").filter(|u| !u.is_empty()) {
            self.client.api_url = url;
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .with_context(|| format!("server.bind is not a socket address: '{}'", self.server.bind))
    }

    /// Rejects values the server or client cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;

        if self.pagination.default_limit == 0 {
            bail!("pagination.default_limit must be >= 1");
        }
        if self.pagination.max_limit == 0 {
            bail!("pagination.max_limit must be >= 1");
        }
        if self.pagination.default_limit > self.pagination.max_limit {
            bail!(
                "pagination.default_limit ({}) must not exceed pagination.max_limit ({})",
                self.pagination.default_limit,
                self.pagination.max_limit
            );
        }

        if self.client.timeout_secs == 0 {
            bail!("client.timeout_secs must be > 0");
        }

        Ok(())
    }
}

/// Parses configuration text, applies overrides read through `lookup`, and
/// validates the result.
pub fn parse_config<F>(content: &str, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: Config = toml::from_str(content).context("Failed to parse config file")?;
    config.apply_env_overrides(lookup)?;
    config.validate()?;
    Ok(config)
}

/// Reads and parses `path` with overrides from the process environment.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content, |key| std::env::var(key).ok())
}

/// Like [`load_config`], but a missing file yields the defaults (still
/// subject to environment overrides).
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        return load_config(path);
    }
    parse_config("", |key| std::env::var(key).ok())
}
