//! Application state - shared across all handlers.

use std::sync::Arc;

use blogicum_core::ports::{Clock, Renderer, UserRepository};
use blogicum_core::services::{BlogService, Repositories};
use blogicum_infra::{DatabaseConnections, InMemoryStore, JsonRenderer, SystemClock};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub blog: BlogService,
    pub users: Arc<dyn UserRepository>,
    pub renderer: Arc<dyn Renderer>,
    pub db: Option<Arc<DatabaseConnections>>,
    pub storage: &'static str,
}

impl AppState {
    /// Build the application state, preferring PostgreSQL when configured.
    pub async fn new(config: &AppConfig) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let state = match connect(config).await {
            Some((db, repos)) => Self {
                db: Some(db),
                storage: "postgres",
                ..Self::from_repositories(repos, clock, config.page_size)
            },
            None => Self::in_memory(clock, config.page_size),
        };

        tracing::info!(storage = state.storage, page_size = config.page_size, "Application state initialized");
        state
    }

    pub fn from_repositories(repos: Repositories, clock: Arc<dyn Clock>, page_size: usize) -> Self {
        Self {
            users: repos.users.clone(),
            blog: BlogService::new(repos, clock).with_page_size(page_size),
            renderer: Arc::new(JsonRenderer),
            db: None,
            storage: "memory",
        }
    }

    /// State backed by a fresh in-memory store. Nothing survives a restart.
    pub fn in_memory(clock: Arc<dyn Clock>, page_size: usize) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self::from_repositories(store.repositories(), clock, page_size)
    }
}

#[cfg(feature = "postgres")]
async fn connect(config: &AppConfig) -> Option<(Arc<DatabaseConnections>, Repositories)> {
    use blogicum_infra::database::{
        PostgresCategoryRepository, PostgresCommentRepository, PostgresLocationRepository,
        PostgresPostRepository, PostgresUserRepository,
    };

    let Some(db_config) = &config.database else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return None;
    };

    match DatabaseConnections::init(db_config).await {
        Ok(connections) => {
            let conn = connections.main.clone();
            let repos = Repositories {
                users: Arc::new(PostgresUserRepository::new(conn.clone())),
                posts: Arc::new(PostgresPostRepository::new(conn.clone())),
                categories: Arc::new(PostgresCategoryRepository::new(conn.clone())),
                locations: Arc::new(PostgresLocationRepository::new(conn.clone())),
                comments: Arc::new(PostgresCommentRepository::new(conn)),
            };
            Some((Arc::new(connections), repos))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database. Using in-memory fallback.");
            None
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn connect(config: &AppConfig) -> Option<(Arc<DatabaseConnections>, Repositories)> {
    if config.database.is_some() {
        tracing::warn!("DATABASE_URL is set but the postgres feature is disabled. Using in-memory storage.");
    } else {
        tracing::info!("Running without postgres feature - using in-memory storage");
    }
    None
}
