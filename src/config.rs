//! Config module contains the top-level config for the app.
use std::env;

use config_crate::{Config as RawConfig, ConfigError, Environment, File};

/// Basic settings - HTTP binding address and database DSN
#[derive(Debug, Deserialize, Clone)]
pub struct Server {
    pub host: String,
    pub port: String,
    pub database: String,
    pub thread_count: usize,
}

/// Secret shared with the identity provider that signs session tokens
#[derive(Debug, Deserialize, Clone)]
pub struct Auth {
    pub jwt_secret: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Icon {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

/// Public facing site description used by the sitemap and the web app manifest
#[derive(Debug, Deserialize, Clone)]
pub struct Site {
    pub base_url: String,
    pub name: String,
    pub short_name: String,
    pub description: String,
    pub theme_color: String,
    pub background_color: String,
    pub lang: String,
    pub static_pages: Vec<String>,
    #[serde(default)]
    pub icons: Vec<Icon>,
}

/// Global app config
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: Server,
    pub auth: Auth,
    pub site: Site,
}

impl Config {
    /// Creates config from base.toml, which are overwritten by <env>.toml, where env is one of development,
    /// test, production. After that it could be overwritten by env variables like REPAIRS_SERVER__PORT
    /// (this will override `server.port` field in config).
    pub fn new() -> Result<Self, ConfigError> {
        // Optional file specific for environment
        let env = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        Config::with_env(env)
    }

    pub fn with_env(env: impl Into<String>) -> Result<Self, ConfigError> {
        let mut s = RawConfig::new();

        s.merge(File::with_name("config/base"))?;
        s.merge(File::with_name(&format!("config/{}", env.into())).required(false))?;
        s.merge(Environment::with_prefix("REPAIRS").separator("__"))?;
        s.try_into()
    }
}
