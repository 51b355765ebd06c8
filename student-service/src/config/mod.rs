use serde::Deserialize;
use service_core::config::{self as core_config, get_env};
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct StudentConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub store: StoreBackend,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Mongo,
    Memory,
}

impl StudentConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common = core_config::Config::load()?;
        let is_prod = common.is_production();

        let store: StoreBackend = get_env("STORE_BACKEND", Some("mongo"), false)?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        // The in-memory backend never dials out, so the URI is optional there.
        let uri = match store {
            StoreBackend::Mongo => get_env("MONGO_URI", None, is_prod)?,
            StoreBackend::Memory => env::var("MONGO_URI").unwrap_or_default(),
        };

        Ok(StudentConfig {
            common,
            mongodb: MongoConfig {
                uri,
                database: get_env("DB_NAME", Some("student_db"), is_prod)?,
                collection: get_env("COLLECTION_NAME", Some("students"), is_prod)?,
            },
            store,
            log_level: get_env("LOG_LEVEL", Some("info"), false)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
        })
    }

    /// Configuration for an in-process run against the memory backend.
    pub fn in_memory(port: u16) -> Self {
        StudentConfig {
            common: core_config::Config {
                port,
                ..Default::default()
            },
            mongodb: MongoConfig {
                uri: String::new(),
                database: "student_db".to_string(),
                collection: "students".to_string(),
            },
            store: StoreBackend::Memory,
            log_level: "info".to_string(),
            otlp_endpoint: None,
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}
