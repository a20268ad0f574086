use std::env;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::services::LoadingMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    /// Base URL of the fleet backend, e.g. `http://127.0.0.1:8082`.
    pub url: String,
    /// Credentials attached to every request, when present.
    pub auth: Option<AuthScheme>,
}

/// Which header shape carries the credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "lowercase")]
pub enum AuthScheme {
    /// Session-cookie style: the value is sent verbatim in a `Cookie` header.
    Session { cookie: String },
    /// Token style: `Authorization: Bearer <token>`.
    Token { token: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polling {
    /// Seconds between poll cycles.
    pub interval_secs: u64,
    /// Which cycles toggle the store's loading flag.
    #[serde(default)]
    pub loading_mode: LoadingMode,
    /// Whether tracking is considered active at startup.
    pub tracking_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub server: Server,
    pub polling: Polling,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Environment::default().separator("_"))
            .build()?
            .try_deserialize()
    }
}
