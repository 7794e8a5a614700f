//! Database connection management and SeaORM-backed repositories.

mod connections;

#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
pub mod postgres_repo;

#[cfg(feature = "postgres")]
pub mod entity;

pub use connections::{DatabaseConfig, DatabaseConnections};

#[cfg(feature = "postgres")]
pub use postgres_repo::{
    PostgresCategoryRepository, PostgresCommentRepository, PostgresLocationRepository,
    PostgresPostRepository, PostgresUserRepository,
};

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;
