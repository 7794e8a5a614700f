use sea_orm_migration::prelude::*;

use crate::m20240601_000002_create_blog_tables::{Comments, Posts};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Listings filter on the flag and order by pub_date.
        manager
            .create_index(
                Index::create()
                    .name("index-posts-is_published-pub_date")
                    .table(Posts::Table)
                    .col(Posts::IsPublished)
                    .col(Posts::PubDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("index-posts-author_id")
                    .table(Posts::Table)
                    .col(Posts::AuthorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("index-posts-category_id")
                    .table(Posts::Table)
                    .col(Posts::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("index-comments-post_id-created_at")
                    .table(Comments::Table)
                    .col(Comments::PostId)
                    .col(Comments::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "index-comments-post_id-created_at",
            "index-posts-category_id",
            "index-posts-author_id",
            "index-posts-is_published-pub_date",
        ] {
            manager.drop_index(Index::drop().name(name).to_owned()).await?;
        }

        Ok(())
    }
}
