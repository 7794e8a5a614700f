use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Comment, CommentEntry, Location, Post, PostEntry, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Find a user by their login name.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Candidate filter for post listings.
///
/// Every filter is optional. `visible_at` asks the store to pre-apply the
/// public visibility rule at that instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub visible_at: Option<DateTime<Utc>>,
}

impl PostQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn public(now: DateTime<Utc>) -> Self {
        Self {
            visible_at: Some(now),
            ..Self::default()
        }
    }

    pub fn by_author(mut self, author_id: Uuid) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Posts matching `query` with author, category, location and comment
    /// count attached, newest `pub_date` first.
    async fn find_entries(&self, query: &PostQuery) -> Result<Vec<PostEntry>, RepoError>;

    /// A single post with its relations.
    async fn find_entry(&self, id: Uuid) -> Result<Option<PostEntry>, RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;

    /// Categories authors may file posts under, by title.
    async fn find_published(&self) -> Result<Vec<Category>, RepoError>;
}

/// Location repository.
#[async_trait]
pub trait LocationRepository: BaseRepository<Location, Uuid> {
    async fn find_published(&self) -> Result<Vec<Location>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments of a post with their authors, oldest first.
    async fn find_for_post(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, RepoError>;

    /// A comment of `post_id` by `author_id`. Any mismatch reads as absent.
    async fn find_owned(
        &self,
        id: Uuid,
        post_id: Uuid,
        author_id: Uuid,
    ) -> Result<Option<Comment>, RepoError>;
}
