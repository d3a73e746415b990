//! Process configuration read from the environment (and `.env` when present).

use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PRODUCTION_URL: &str = "https://kitch-katch.onrender.com";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// `NODE_ENV=production` selects production; anything else is development.
    pub fn from_value(v: Option<&str>) -> Self {
        match v {
            Some("production") => Environment::Production,
            _ => Environment::Development,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    /// Public base URL advertised in the API documentation.
    pub public_url: String,
    pub database_url: String,
    pub db_max_connections: u32,
}

impl AppConfig {
    /// Load `.env` if present, then read the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parse_or(&get, "PORT", DEFAULT_PORT)?;
        let environment = Environment::from_value(get("NODE_ENV").as_deref());
        let public_url = match environment {
            Environment::Production => {
                get("API_URL").unwrap_or_else(|| DEFAULT_PRODUCTION_URL.into())
            }
            Environment::Development => format!("http://localhost:{}", port),
        };
        Ok(Self {
            host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            environment,
            public_url,
            database_url: get("DATABASE_URL")
                .unwrap_or_else(|| "postgres://localhost/kitchkatch".into()),
            db_max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 10)?,
        })
    }

    pub fn server_description(&self) -> &'static str {
        match self.environment {
            Environment::Production => "Production server",
            Environment::Development => "Development server",
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(key) {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: v }),
    }
}
