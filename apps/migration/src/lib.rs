//! Schema migrations for the blog database.

pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_users;
mod m20240601_000002_create_blog_tables;
mod m20240601_000003_add_post_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_users::Migration),
            Box::new(m20240601_000002_create_blog_tables::Migration),
            Box::new(m20240601_000003_add_post_indexes::Migration),
        ]
    }
}
