//! Configuration management for the mail relay

use crate::domain::ServiceConfig;
use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

/// Application configuration
///
/// Loaded once at startup and passed to the server explicitly; nothing
/// reads the environment after this point.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server host
    pub http_host: String,
    /// HTTP server port
    pub http_port: u16,
    /// Shared secret expected in the `x-pigeon-secret` header
    pub secret: String,
    /// Named mail-service configurations; guaranteed non-empty
    pub services: HashMap<String, ServiceConfig>,
    /// Directory holding theme templates
    pub template_dir: PathBuf,
    /// Footer applied to rendered content when the request has none
    pub default_footer: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let services_json = env::var("PIGEON_SERVICES").context("PIGEON_SERVICES is required")?;
        let services: HashMap<String, ServiceConfig> = serde_json::from_str(&services_json)
            .context("PIGEON_SERVICES is not a valid service mapping")?;

        // The selector has no valid answer for an empty mapping; fail at
        // startup instead.
        if services.is_empty() {
            bail!("PIGEON_SERVICES must configure at least one service");
        }

        Ok(Self {
            http_host: env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid HTTP_PORT")?,
            secret: env::var("PIGEON_SECRET").context("PIGEON_SECRET is required")?,
            services,
            template_dir: env::var("PIGEON_TEMPLATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("templates")),
            default_footer: env::var("PIGEON_DEFAULT_FOOTER").ok(),
        })
    }

    /// Get HTTP server address
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}
