//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use blogicum_core::domain::{
    Author, Category, Comment, CommentEntry, Location, PostEntry, User,
};
use blogicum_core::error::RepoError;
use blogicum_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostQuery, PostRepository,
    UserRepository,
};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::location::{self, Entity as LocationEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, repo_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL location repository.
pub type PostgresLocationRepository = PostgresBaseRepository<LocationEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = match email.split_once('@') {
            Some((local, domain)) => match local.chars().next() {
                Some(first) if local.len() > 1 => format!("{first}***@{domain}"),
                _ => format!("***@{domain}"),
            },
            None => "***".to_string(),
        };
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.map(Into::into))
    }
}

impl PostgresPostRepository {
    /// Attach authors, locations and comment counts to loaded posts.
    async fn hydrate(
        &self,
        rows: Vec<(post::Model, Option<category::Model>)>,
    ) -> Result<Vec<PostEntry>, RepoError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<Uuid> = rows.iter().map(|(p, _)| p.id).collect();
        let mut author_ids: Vec<Uuid> = rows.iter().map(|(p, _)| p.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();
        let mut location_ids: Vec<Uuid> = rows.iter().filter_map(|(p, _)| p.location_id).collect();
        location_ids.sort_unstable();
        location_ids.dedup();

        let authors: HashMap<Uuid, Author> = UserEntity::find()
            .filter(user::Column::Id.is_in(author_ids))
            .all(&self.db)
            .await
            .map_err(repo_err)?
            .into_iter()
            .map(|m| {
                (
                    m.id,
                    Author {
                        id: m.id,
                        username: m.username,
                    },
                )
            })
            .collect();

        let locations: HashMap<Uuid, Location> = if location_ids.is_empty() {
            HashMap::new()
        } else {
            LocationEntity::find()
                .filter(location::Column::Id.is_in(location_ids))
                .all(&self.db)
                .await
                .map_err(repo_err)?
                .into_iter()
                .map(|m| (m.id, m.into()))
                .collect()
        };

        let comment_counts: HashMap<Uuid, i64> = CommentEntity::find()
            .select_only()
            .column(comment::Column::PostId)
            .column_as(Expr::col(comment::Column::Id).count(), "comment_count")
            .filter(comment::Column::PostId.is_in(post_ids))
            .group_by(comment::Column::PostId)
            .into_tuple::<(Uuid, i64)>()
            .all(&self.db)
            .await
            .map_err(repo_err)?
            .into_iter()
            .collect();

        let entries = rows
            .into_iter()
            .filter_map(|(post, category)| {
                let author = authors.get(&post.author_id)?.clone();
                let location = post.location_id.and_then(|id| locations.get(&id).cloned());
                let comment_count = comment_counts.get(&post.id).copied().unwrap_or(0).max(0) as u64;

                Some(PostEntry {
                    author,
                    category: category.map(Into::into),
                    location,
                    comment_count,
                    post: post.into(),
                })
            })
            .collect();

        Ok(entries)
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_entries(&self, query: &PostQuery) -> Result<Vec<PostEntry>, RepoError> {
        let mut select = PostEntity::find().find_also_related(CategoryEntity);

        if let Some(author_id) = query.author_id {
            select = select.filter(post::Column::AuthorId.eq(author_id));
        }
        if let Some(category_id) = query.category_id {
            select = select.filter(post::Column::CategoryId.eq(category_id));
        }
        if let Some(now) = query.visible_at {
            select = select
                .filter(post::Column::IsPublished.eq(true))
                .filter(post::Column::PubDate.lte(now))
                .filter(
                    Condition::any()
                        .add(post::Column::CategoryId.is_null())
                        .add(category::Column::IsPublished.eq(true)),
                );
        }

        let rows = select
            .order_by_desc(post::Column::PubDate)
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        tracing::debug!(?query, rows = rows.len(), "Loaded post candidates");
        self.hydrate(rows).await
    }

    async fn find_entry(&self, id: Uuid) -> Result<Option<PostEntry>, RepoError> {
        let row = PostEntity::find_by_id(id)
            .find_also_related(CategoryEntity)
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_published(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::IsPublished.eq(true))
            .order_by_asc(category::Column::Title)
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl LocationRepository for PostgresLocationRepository {
    async fn find_published(&self) -> Result<Vec<Location>, RepoError> {
        let result = LocationEntity::find()
            .filter(location::Column::IsPublished.eq(true))
            .order_by_asc(location::Column::Name)
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_for_post(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, RepoError> {
        let rows = CommentEntity::find()
            .find_also_related(UserEntity)
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(rows
            .into_iter()
            .filter_map(|(comment, author)| {
                let author = author?;
                Some(CommentEntry {
                    comment: Comment::from(comment),
                    author: Author {
                        id: author.id,
                        username: author.username,
                    },
                })
            })
            .collect())
    }

    async fn find_owned(
        &self,
        id: Uuid,
        post_id: Uuid,
        author_id: Uuid,
    ) -> Result<Option<Comment>, RepoError> {
        let result = CommentEntity::find_by_id(id)
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::AuthorId.eq(author_id))
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.map(Into::into))
    }
}
