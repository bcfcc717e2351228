use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::net::{IpAddr, SocketAddr};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub app: AppConfig,
    pub progress: ProgressConfig,
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub name: String,
    pub environment: Environment,
    pub static_dir: String,
}

/// Progress state-machine knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressConfig {
    /// Watch percentage at or above which a lesson auto-completes.
    pub completion_threshold: f64,
    /// Updates below this percentage (and not completed) are suppressed
    /// from the activity feed.
    pub significant_progress_floor: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub default_limit: i64,
    /// Interval the dashboard is expected to re-poll at.
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Server configuration
        let host = env::var("SERVER_HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string())
            .parse::<IpAddr>()
            .context("Failed to parse SERVER_HOST")?;

        let port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .context("Failed to parse SERVER_PORT")?;

        // Database configuration
        let db_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let db_max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(val) => Some(
                val.parse()
                    .context("Failed to parse DATABASE_MAX_CONNECTIONS")?,
            ),
            Err(_) => Some(10),
        };
        let db_min_connections = match env::var("DATABASE_MIN_CONNECTIONS") {
            Ok(val) => Some(
                val.parse()
                    .context("Failed to parse DATABASE_MIN_CONNECTIONS")?,
            ),
            Err(_) => Some(1),
        };

        // App configuration
        let environment_str =
            env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let environment = match environment_str.to_lowercase().as_str() {
            "production" => Environment::Production,
            "staging" => Environment::Staging,
            _ => Environment::Development,
        };

        let app_name = env::var("APP_NAME").unwrap_or_else(|_| "LMS Backend".to_string());
        let static_dir = env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string());

        // Progress tracking configuration
        let completion_threshold = match env::var("COMPLETION_THRESHOLD") {
            Ok(val) => val.parse().context("Failed to parse COMPLETION_THRESHOLD")?,
            Err(_) => 90.0,
        };
        let significant_progress_floor = match env::var("SIGNIFICANT_PROGRESS_FLOOR") {
            Ok(val) => val
                .parse()
                .context("Failed to parse SIGNIFICANT_PROGRESS_FLOOR")?,
            Err(_) => 50.0,
        };

        // Activity feed configuration
        let default_limit = match env::var("FEED_DEFAULT_LIMIT") {
            Ok(val) => val.parse().context("Failed to parse FEED_DEFAULT_LIMIT")?,
            Err(_) => 20,
        };
        let poll_interval_secs = match env::var("FEED_POLL_INTERVAL_SECS") {
            Ok(val) => val
                .parse()
                .context("Failed to parse FEED_POLL_INTERVAL_SECS")?,
            Err(_) => 30,
        };

        Ok(Config {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url: db_url,
                max_connections: db_max_connections,
                min_connections: db_min_connections,
            },
            app: AppConfig {
                name: app_name,
                environment,
                static_dir,
            },
            progress: ProgressConfig {
                completion_threshold,
                significant_progress_floor,
            },
            feed: FeedConfig {
                default_limit,
                poll_interval_secs,
            },
        })
    }

    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }

    #[allow(unused)]
    pub fn is_production(&self) -> bool {
        self.app.environment == Environment::Production
    }
}

// Use once_cell for a global config instance that's initialized once
use once_cell::sync::OnceCell;

static CONFIG: OnceCell<Config> = OnceCell::new();

pub fn init() -> Result<&'static Config> {
    CONFIG.get_or_try_init(Config::from_env)
}

pub fn get() -> &'static Config {
    CONFIG.get().expect("Config is not initialized")
}
