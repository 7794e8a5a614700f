//! In-memory implementation of every repository port.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blogicum_core::domain::{Category, Comment, CommentEntry, Location, Post, PostEntry, User};
use blogicum_core::error::RepoError;
use blogicum_core::policy::is_publicly_visible;
use blogicum_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, LocationRepository, PostQuery,
    PostRepository, UserRepository,
};
use blogicum_core::services::Repositories;

/// Tables kept in `HashMap`s behind async `RwLock`s.
///
/// Data is lost on process restart. Methods holding more than one guard
/// acquire them in field order: posts, users, categories, locations,
/// comments.
#[derive(Default)]
pub struct InMemoryStore {
    posts: RwLock<HashMap<Uuid, Post>>,
    users: RwLock<HashMap<Uuid, User>>,
    categories: RwLock<HashMap<Uuid, Category>>,
    locations: RwLock<HashMap<Uuid, Location>>,
    comments: RwLock<HashMap<Uuid, Comment>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand the same store out as every repository.
    pub fn repositories(self: &Arc<Self>) -> Repositories {
        Repositories {
            users: self.clone(),
            posts: self.clone(),
            categories: self.clone(),
            locations: self.clone(),
            comments: self.clone(),
        }
    }

    fn entry(
        post: &Post,
        users: &HashMap<Uuid, User>,
        categories: &HashMap<Uuid, Category>,
        locations: &HashMap<Uuid, Location>,
        comments: &HashMap<Uuid, Comment>,
    ) -> Option<PostEntry> {
        let author = users.get(&post.author_id)?.author();

        Some(PostEntry {
            post: post.clone(),
            author,
            category: post.category_id.and_then(|id| categories.get(&id).cloned()),
            location: post.location_id.and_then(|id| locations.get(&id).cloned()),
            comment_count: comments.values().filter(|c| c.post_id == post.id).count() as u64,
        })
    }
}

/// CRUD over one table keyed by the entity's `id`.
macro_rules! keyed_table {
    ($entity:ty, $table:ident) => {
        #[async_trait]
        impl BaseRepository<$entity, Uuid> for InMemoryStore {
            async fn find_by_id(&self, id: Uuid) -> Result<Option<$entity>, RepoError> {
                Ok(self.$table.read().await.get(&id).cloned())
            }

            async fn save(&self, entity: $entity) -> Result<$entity, RepoError> {
                self.check_unique(&entity).await?;
                self.$table.write().await.insert(entity.id, entity.clone());
                Ok(entity)
            }

            async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
                self.$table
                    .write()
                    .await
                    .remove(&id)
                    .map(|_| ())
                    .ok_or(RepoError::NotFound)
            }
        }
    };
}

/// Unique constraints the database would enforce.
#[async_trait]
trait UniqueCheck<T> {
    async fn check_unique(&self, entity: &T) -> Result<(), RepoError>;
}

#[async_trait]
impl UniqueCheck<User> for InMemoryStore {
    async fn check_unique(&self, user: &User) -> Result<(), RepoError> {
        let users = self.users.read().await;
        if users
            .values()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(RepoError::Constraint(format!(
                "username '{}' already exists",
                user.username
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl UniqueCheck<Category> for InMemoryStore {
    async fn check_unique(&self, category: &Category) -> Result<(), RepoError> {
        let categories = self.categories.read().await;
        if categories
            .values()
            .any(|c| c.id != category.id && c.slug == category.slug)
        {
            return Err(RepoError::Constraint(format!(
                "slug '{}' already exists",
                category.slug
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl UniqueCheck<Location> for InMemoryStore {
    async fn check_unique(&self, _: &Location) -> Result<(), RepoError> {
        Ok(())
    }
}

#[async_trait]
impl UniqueCheck<Comment> for InMemoryStore {
    async fn check_unique(&self, _: &Comment) -> Result<(), RepoError> {
        Ok(())
    }
}

keyed_table!(User, users);
keyed_table!(Category, categories);
keyed_table!(Location, locations);
keyed_table!(Comment, comments);

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        if !self.users.read().await.contains_key(&post.author_id) {
            return Err(RepoError::Constraint("post author does not exist".to_string()));
        }
        self.posts.write().await.insert(post.id, post.clone());
        Ok(post)
    }

    /// Comments go with their post.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.posts
            .write()
            .await
            .remove(&id)
            .ok_or(RepoError::NotFound)?;
        self.comments.write().await.retain(|_, c| c.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn find_entries(&self, query: &PostQuery) -> Result<Vec<PostEntry>, RepoError> {
        let posts = self.posts.read().await;
        let users = self.users.read().await;
        let categories = self.categories.read().await;
        let locations = self.locations.read().await;
        let comments = self.comments.read().await;

        let mut entries: Vec<PostEntry> = posts
            .values()
            .filter(|p| query.author_id.is_none_or(|id| p.author_id == id))
            .filter(|p| query.category_id.is_none_or(|id| p.category_id == Some(id)))
            .filter(|p| {
                query.visible_at.is_none_or(|now| {
                    let category = p.category_id.and_then(|id| categories.get(&id));
                    is_publicly_visible(p, category, now)
                })
            })
            .filter_map(|p| Self::entry(p, &users, &categories, &locations, &comments))
            .collect();

        entries.sort_by(|a, b| b.post.pub_date.cmp(&a.post.pub_date));
        Ok(entries)
    }

    async fn find_entry(&self, id: Uuid) -> Result<Option<PostEntry>, RepoError> {
        let posts = self.posts.read().await;
        let Some(post) = posts.get(&id) else {
            return Ok(None);
        };

        let users = self.users.read().await;
        let categories = self.categories.read().await;
        let locations = self.locations.read().await;
        let comments = self.comments.read().await;

        Ok(Self::entry(post, &users, &categories, &locations, &comments))
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let categories = self.categories.read().await;
        Ok(categories.values().find(|c| c.slug == slug).cloned())
    }

    async fn find_published(&self) -> Result<Vec<Category>, RepoError> {
        let categories = self.categories.read().await;
        let mut published: Vec<Category> =
            categories.values().filter(|c| c.is_published).cloned().collect();
        published.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(published)
    }
}

#[async_trait]
impl LocationRepository for InMemoryStore {
    async fn find_published(&self) -> Result<Vec<Location>, RepoError> {
        let locations = self.locations.read().await;
        let mut published: Vec<Location> =
            locations.values().filter(|l| l.is_published).cloned().collect();
        published.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(published)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn find_for_post(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, RepoError> {
        let users = self.users.read().await;
        let comments = self.comments.read().await;

        let mut entries: Vec<CommentEntry> = comments
            .values()
            .filter(|c| c.post_id == post_id)
            .filter_map(|c| {
                users.get(&c.author_id).map(|u| CommentEntry {
                    comment: c.clone(),
                    author: u.author(),
                })
            })
            .collect();

        entries.sort_by(|a, b| a.comment.created_at.cmp(&b.comment.created_at));
        Ok(entries)
    }

    async fn find_owned(
        &self,
        id: Uuid,
        post_id: Uuid,
        author_id: Uuid,
    ) -> Result<Option<Comment>, RepoError> {
        let comments = self.comments.read().await;
        Ok(comments
            .get(&id)
            .filter(|c| c.post_id == post_id && c.author_id == author_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};

    use blogicum_core::domain::PostDraft;

    use super::*;

    fn user(name: &str) -> User {
        User::new(name.into(), format!("{name}@example.com"), "hash".into())
    }

    fn post(author: &User, is_published: bool, pub_date: chrono::DateTime<Utc>) -> Post {
        Post::new(
            author.id,
            PostDraft {
                title: "T".into(),
                text: "B".into(),
                pub_date,
                is_published,
                category_id: None,
                location_id: None,
                image: None,
            },
            pub_date,
        )
    }

    #[tokio::test]
    async fn duplicate_username_violates_constraint() {
        let store = InMemoryStore::new();
        BaseRepository::<User, Uuid>::save(&store, user("alice")).await.unwrap();

        let result = BaseRepository::<User, Uuid>::save(&store, user("alice")).await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn public_query_prefilters_and_orders_newest_first() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let alice = BaseRepository::<User, Uuid>::save(&store, user("alice")).await.unwrap();

        let older = post(&alice, true, now - TimeDelta::days(2));
        let newer = post(&alice, true, now - TimeDelta::days(1));
        let draft = post(&alice, false, now - TimeDelta::days(1));
        let future = post(&alice, true, now + TimeDelta::days(1));
        for p in [&older, &newer, &draft, &future] {
            BaseRepository::<Post, Uuid>::save(&store, p.clone()).await.unwrap();
        }

        let entries = store.find_entries(&PostQuery::public(now)).await.unwrap();
        let ids: Vec<Uuid> = entries.iter().map(|e| e.post.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);

        let all = store
            .find_entries(&PostQuery::all().by_author(alice.id))
            .await
            .unwrap();
        assert_eq!(all.len(), 4);
    }

    #[tokio::test]
    async fn deleting_a_post_removes_its_comments() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let alice = BaseRepository::<User, Uuid>::save(&store, user("alice")).await.unwrap();
        let p = BaseRepository::<Post, Uuid>::save(&store, post(&alice, true, now))
            .await
            .unwrap();
        BaseRepository::<Comment, Uuid>::save(&store, Comment::new(p.id, alice.id, "hi".into(), now))
            .await
            .unwrap();

        assert_eq!(store.find_entry(p.id).await.unwrap().unwrap().comment_count, 1);

        BaseRepository::<Post, Uuid>::delete(&store, p.id).await.unwrap();
        assert!(store.find_for_post(p.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_owned_requires_matching_post_and_author() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let alice = BaseRepository::<User, Uuid>::save(&store, user("alice")).await.unwrap();
        let p = BaseRepository::<Post, Uuid>::save(&store, post(&alice, true, now))
            .await
            .unwrap();
        let c = BaseRepository::<Comment, Uuid>::save(
            &store,
            Comment::new(p.id, alice.id, "hi".into(), now),
        )
        .await
        .unwrap();

        assert!(store.find_owned(c.id, p.id, alice.id).await.unwrap().is_some());
        assert!(store.find_owned(c.id, p.id, Uuid::new_v4()).await.unwrap().is_none());
        assert!(store.find_owned(c.id, Uuid::new_v4(), alice.id).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_reads_and_writes_make_progress() {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        let alice = BaseRepository::<User, Uuid>::save(&*store, user("alice")).await.unwrap();
        let p = BaseRepository::<Post, Uuid>::save(&*store, post(&alice, true, now))
            .await
            .unwrap();
        let post_id = p.id;

        let mut tasks = tokio::task::JoinSet::new();
        for worker in 0..4 {
            let s = store.clone();
            tasks.spawn(async move {
                for _ in 0..300 {
                    s.find_entries(&PostQuery::public(now)).await.unwrap();
                    s.find_entry(post_id).await.unwrap();
                }
            });

            let s = store.clone();
            tasks.spawn(async move {
                for _ in 0..300 {
                    s.find_for_post(post_id).await.unwrap();
                }
            });

            let s = store.clone();
            let mut writer = user(&format!("writer{worker}"));
            tasks.spawn(async move {
                for i in 0..300 {
                    writer.first_name = format!("n{i}");
                    BaseRepository::<User, Uuid>::save(&*s, writer.clone()).await.unwrap();
                }
            });

            let s = store.clone();
            let author = alice.id;
            tasks.spawn(async move {
                for _ in 0..300 {
                    let c = Comment::new(post_id, author, "hi".into(), now);
                    BaseRepository::<Comment, Uuid>::save(&*s, c).await.unwrap();
                }
            });
        }

        let all = async {
            while let Some(joined) = tasks.join_next().await {
                joined.unwrap();
            }
        };
        tokio::time::timeout(std::time::Duration::from_secs(30), all)
            .await
            .expect("store operations stalled");

        assert_eq!(store.find_for_post(p.id).await.unwrap().len(), 1200);
    }
}
