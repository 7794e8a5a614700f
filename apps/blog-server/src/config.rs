//! Application configuration loaded from environment variables.

use std::env;

use blogicum_core::pagination::DEFAULT_PAGE_SIZE;
use blogicum_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    /// Posts per listing page.
    pub page_size: usize,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| {
            let mut config = DatabaseConfig::new(url);
            if let Some(max) = parse_var("DB_MAX_CONNECTIONS") {
                config.max_connections = max;
            }
            if let Some(min) = parse_var("DB_MIN_CONNECTIONS") {
                config.min_connections = min;
            }
            config
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8080),
            database,
            page_size: parse_var("PAGE_SIZE")
                .filter(|&size| size > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}
