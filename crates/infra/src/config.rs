//! Runtime configuration.
//!
//! Sources, later ones winning: built-in dev defaults, an optional
//! `facturas.toml` in the working directory, then `FACTURAS_*` environment
//! variables (a `.env` file is loaded first if present).

use serde::Deserialize;
use thiserror::Error;

pub const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] ::config::ConfigError),
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Socket address the HTTP server binds to.
    pub bind_addr: String,
    /// Shared HS256 secret used to verify bearer tokens.
    pub jwt_secret: String,
    /// `tracing` filter directive, e.g. `info` or `facturas_infra=debug`.
    pub log_filter: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_sources(::config::Environment::with_prefix("FACTURAS"))
    }

    fn from_sources(env: ::config::Environment) -> Result<Self, ConfigError> {
        let cfg = ::config::Config::builder()
            .set_default("bind_addr", "0.0.0.0:8080")?
            .set_default("jwt_secret", DEV_JWT_SECRET)?
            .set_default("log_filter", "info")?
            .add_source(::config::File::with_name("facturas").required(false))
            .add_source(env)
            .build()?;

        Ok(cfg.try_deserialize()?)
    }

    /// Whether the token secret is still the built-in development default.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}
