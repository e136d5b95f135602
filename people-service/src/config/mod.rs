use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

const DEFAULT_DATABASE: &str = "people";

#[derive(Debug, Clone, Deserialize)]
pub struct PeopleConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    /// OTLP collector for span export; local JSON logs only when unset.
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

impl PeopleConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let uri = required_env("MONGODB_URL")?;
        let database = match env::var("MONGODB_DATABASE") {
            Ok(name) => name,
            Err(_) => database_from_uri(&uri).unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
        };

        Ok(PeopleConfig {
            common: common_config,
            mongodb: MongoConfig { uri, database },
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
        })
    }
}

fn required_env(key: &str) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} is required but not set",
            key
        ))),
    }
}

/// Database named in the path segment of a connection string, e.g. `people`
/// in `mongodb://host:27017/people?retryWrites=true`.
fn database_from_uri(uri: &str) -> Option<String> {
    let (_, rest) = uri.split_once("://")?;
    let (_, path) = rest.split_once('/')?;
    let name = path.split('?').next().unwrap_or_default();

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
