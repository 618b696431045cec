use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub payment: PaymentConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// When unset, the service runs on the in-memory store.
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    /// No gateway: checkout requests book directly without payment.
    #[serde(rename = "none")]
    Disabled,
    Mock,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentConfig {
    pub mode: PaymentMode,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file; optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Environment variables with a WAVECREST prefix,
            // e.g. WAVECREST__SERVER__PORT=9090
            .add_source(config::Environment::with_prefix("WAVECREST").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
