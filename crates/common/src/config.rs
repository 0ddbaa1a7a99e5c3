//! Application configuration.

use serde::Deserialize;
use std::path::Path;

use crate::storage::StorageConfig;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Managed backend (identity + storage API) configuration.
    pub backend: BackendConfig,
    /// Object storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Sign-in configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Public site metadata.
    #[serde(default)]
    pub site: SiteConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of the site.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL of the managed database.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Whether to run schema migrations on startup.
    #[serde(default = "default_true")]
    pub migrate: bool,
}

/// Managed backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the managed backend (e.g. `https://xyz.supabase.co`).
    pub url: String,
    /// Public (anon) API key sent with every request.
    pub anon_key: String,
    /// Service-role key used for storage writes, if the bucket requires it.
    #[serde(default)]
    pub service_key: Option<String>,
}

/// Sign-in configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// OAuth providers offered on the sign-in button.
    #[serde(default = "default_providers")]
    pub providers: Vec<String>,
    /// Where the identity provider sends the browser after sign-in.
    /// Defaults to the server's public URL.
    #[serde(default)]
    pub redirect_url: Option<String>,
    /// Cookie holding the access token for browser sessions.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            redirect_url: None,
            cookie_name: default_cookie_name(),
        }
    }
}

/// Public site metadata shown on the home and about pages.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Site name.
    #[serde(default = "default_site_name")]
    pub name: String,
    /// One-line description.
    #[serde(default = "default_tagline")]
    pub tagline: String,
    /// Background video shown on the home page.
    #[serde(default)]
    pub background_video_url: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            tagline: default_tagline(),
            background_video_url: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_true() -> bool {
    true
}

fn default_providers() -> Vec<String> {
    vec!["google".to_string(), "discord".to_string()]
}

fn default_cookie_name() -> String {
    "sb-access-token".to_string()
}

fn default_site_name() -> String {
    "Napoleon".to_string()
}

fn default_tagline() -> String {
    "A Community-Driven Film Project".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present) into the process environment
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `NAPOLEON_ENV`)
    /// 4. Environment variables with `NAPOLEON_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("NAPOLEON_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("NAPOLEON")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("NAPOLEON")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Redirect target handed to the identity provider after sign-in.
    #[must_use]
    pub fn sign_in_redirect(&self) -> &str {
        self.auth
            .redirect_url
            .as_deref()
            .unwrap_or(self.server.url.as_str())
    }
}
