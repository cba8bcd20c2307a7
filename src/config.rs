use std::env;
use std::fmt;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;

/// Which record store implementation the server runs against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreBackend {
    #[default]
    Mongo,
    Memory,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort(String),
    UnknownBackend(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort(value) => write!(f, "Invalid PORT: {}", value),
            ConfigError::UnknownBackend(value) => {
                write!(f, "Unknown STORE_BACKEND: {} (expected mongo or memory)", value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Server configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// MongoDB connection string (`DB_URL`).
    pub db_url: Option<String>,
    /// Overrides the database named in the connection string.
    pub db_name: Option<String>,
    pub store_backend: StoreBackend,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            db_url: None,
            db_name: None,
            store_backend: StoreBackend::default(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Config {
    /// Loads `env/.env` and `.env` (when present) into the process environment.
    /// Variables already set take precedence.
    pub fn load_env_files() {
        dotenv::from_path("env/.env").ok();
        dotenv::dotenv().ok();
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT").or_else(|| var("port")) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let store_backend = match var("STORE_BACKEND") {
            None => StoreBackend::Mongo,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "mongo" | "mongodb" => StoreBackend::Mongo,
                "memory" => StoreBackend::Memory,
                _ => return Err(ConfigError::UnknownBackend(raw)),
            },
        };

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            db_url: var("DB_URL"),
            db_name: var("DB_NAME"),
            store_backend,
            cors_allowed_origins,
        })
    }
}
