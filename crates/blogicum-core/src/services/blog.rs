//! Blog flows: listings, detail, post and comment mutations, profile edits.
//!
//! Every listing follows the same pipeline: fetch candidates from storage,
//! keep the ones visible to the viewer, order newest first, cut a page.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Category, Comment, CommentEntry, Location, Post, PostDraft, PostEntry, User, Viewer};
use crate::error::DomainError;
use crate::forms::{CommentForm, FormErrors, PostForm, ProfileForm};
use crate::pagination::{DEFAULT_PAGE_SIZE, Page, get_page};
use crate::policy::ownership::{Outcome, is_owner};
use crate::policy::publication::{Publication, publish_on_save};
use crate::ports::{
    BaseRepository, CategoryRepository, Clock, CommentRepository, LocationRepository, PostQuery, PostRepository,
    UserRepository,
};

/// Storage handles the service works against.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

/// A post after create/edit together with how publish-on-save resolved it.
#[derive(Debug, Clone, Serialize)]
pub struct SavedPost {
    pub post: Post,
    pub publication: Publication,
}

/// Everything the detail page shows.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: PostEntry,
    pub comments: Vec<CommentEntry>,
}

#[derive(Clone)]
pub struct BlogService {
    repos: Repositories,
    clock: Arc<dyn Clock>,
    page_size: usize,
}

impl BlogService {
    pub fn new(repos: Repositories, clock: Arc<dyn Clock>) -> Self {
        Self {
            repos,
            clock,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn repositories(&self) -> &Repositories {
        &self.repos
    }

    async fn listing(
        &self,
        query: PostQuery,
        viewer: Viewer,
        now: DateTime<Utc>,
        page: Option<&str>,
    ) -> Result<Page<PostEntry>, DomainError> {
        let mut entries: Vec<PostEntry> = self
            .repos
            .posts
            .find_entries(&query)
            .await?
            .into_iter()
            .filter(|entry| entry.is_visible_to(viewer, now))
            .collect();

        entries.sort_by(|a, b| b.post.pub_date.cmp(&a.post.pub_date));

        Ok(get_page(&entries, page, self.page_size))
    }

    /// Public front page.
    pub async fn index(&self, page: Option<&str>) -> Result<Page<PostEntry>, DomainError> {
        let now = self.now();
        self.listing(PostQuery::public(now), Viewer::Anonymous, now, page)
            .await
    }

    /// Public posts of a published category.
    pub async fn category_posts(
        &self,
        slug: &str,
        page: Option<&str>,
    ) -> Result<(Category, Page<PostEntry>), DomainError> {
        let category = self
            .repos
            .categories
            .find_by_slug(slug)
            .await?
            .filter(|c| c.is_published)
            .ok_or_else(|| DomainError::not_found("category", slug))?;

        let now = self.now();
        let posts = self
            .listing(
                PostQuery::public(now).in_category(category.id),
                Viewer::Anonymous,
                now,
                page,
            )
            .await?;

        Ok((category, posts))
    }

    /// A user's posts. The owner sees drafts and scheduled posts as well.
    pub async fn profile(
        &self,
        username: &str,
        viewer: Viewer,
        page: Option<&str>,
    ) -> Result<(User, Page<PostEntry>), DomainError> {
        let owner = self
            .repos
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("user", username))?;

        let now = self.now();
        let posts = if viewer.is(owner.id) {
            self.listing(PostQuery::all().by_author(owner.id), viewer, now, page)
                .await?
        } else {
            self.listing(
                PostQuery::public(now).by_author(owner.id),
                Viewer::Anonymous,
                now,
                page,
            )
            .await?
        };

        Ok((owner, posts))
    }

    /// A single post with its comments, if `viewer` may see it.
    pub async fn post_detail(&self, id: Uuid, viewer: Viewer) -> Result<PostDetail, DomainError> {
        let now = self.now();
        let post = self
            .repos
            .posts
            .find_entry(id)
            .await?
            .filter(|entry| entry.is_visible_to(viewer, now))
            .ok_or_else(|| DomainError::not_found("post", id))?;

        let comments = self.repos.comments.find_for_post(id).await?;

        Ok(PostDetail { post, comments })
    }

    /// Categories and locations a post may be filed under.
    pub async fn published_choices(&self) -> Result<(Vec<Category>, Vec<Location>), DomainError> {
        let categories = self.repos.categories.find_published().await?;
        let locations = self.repos.locations.find_published().await?;
        Ok((categories, locations))
    }

    pub fn blank_post_form(&self) -> PostForm {
        PostForm::initial(self.now())
    }

    async fn draft(
        &self,
        form: &PostForm,
        now: DateTime<Utc>,
    ) -> Result<(PostDraft, Publication), DomainError> {
        let (categories, locations) = self.published_choices().await?;
        let cleaned = form
            .clean(&categories, &locations)
            .map_err(DomainError::InvalidForm)?;

        let (pub_date, publication) = publish_on_save(cleaned.pub_date, cleaned.is_published, now);

        let draft = PostDraft {
            title: cleaned.title,
            text: cleaned.text,
            pub_date,
            is_published: publication.is_published(),
            category_id: cleaned.category.map(|c| c.id),
            location_id: cleaned.location.map(|l| l.id),
            image: cleaned.image,
        };

        Ok((draft, publication))
    }

    pub async fn create_post(&self, author_id: Uuid, form: &PostForm) -> Result<SavedPost, DomainError> {
        let now = self.now();
        let (draft, publication) = self.draft(form, now).await?;

        let post = self.repos.posts.save(Post::new(author_id, draft, now)).await?;
        tracing::info!(post_id = %post.id, author_id = %author_id, ?publication, "Post created");

        Ok(SavedPost { post, publication })
    }

    async fn find_post(&self, id: Uuid) -> Result<Post, DomainError> {
        self.repos
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", id))
    }

    /// The edit form prefilled with the post, for its author only.
    pub async fn edit_form(&self, requester: Viewer, id: Uuid) -> Result<Outcome<PostForm>, DomainError> {
        let post = self.find_post(id).await?;
        if !is_owner(requester, post.author_id) {
            return Ok(Outcome::Denied);
        }
        Ok(Outcome::Done(PostForm::from_post(&post)))
    }

    pub async fn edit_post(
        &self,
        requester: Viewer,
        id: Uuid,
        form: &PostForm,
    ) -> Result<Outcome<SavedPost>, DomainError> {
        let mut post = self.find_post(id).await?;
        if !is_owner(requester, post.author_id) {
            tracing::warn!(post_id = %id, requester = ?requester.id(), "Refused edit of another author's post");
            return Ok(Outcome::Denied);
        }

        let (draft, publication) = self.draft(form, self.now()).await?;
        post.apply(draft);

        let post = self.repos.posts.save(post).await?;
        tracing::info!(post_id = %post.id, ?publication, "Post updated");

        Ok(Outcome::Done(SavedPost { post, publication }))
    }

    pub async fn delete_post(&self, requester: Viewer, id: Uuid) -> Result<Outcome<Post>, DomainError> {
        let post = self.find_post(id).await?;
        if !is_owner(requester, post.author_id) {
            tracing::warn!(post_id = %id, requester = ?requester.id(), "Refused deletion of another author's post");
            return Ok(Outcome::Denied);
        }

        self.repos.posts.delete(id).await?;
        tracing::info!(post_id = %id, "Post deleted");

        Ok(Outcome::Done(post))
    }

    /// Comment on a post the author can see.
    pub async fn add_comment(
        &self,
        author_id: Uuid,
        post_id: Uuid,
        form: &CommentForm,
    ) -> Result<Comment, DomainError> {
        let now = self.now();
        self.repos
            .posts
            .find_entry(post_id)
            .await?
            .filter(|entry| entry.is_visible_to(Viewer::User(author_id), now))
            .ok_or_else(|| DomainError::not_found("post", post_id))?;

        let text = form.clean().map_err(DomainError::InvalidForm)?;
        let comment = self
            .repos
            .comments
            .save(Comment::new(post_id, author_id, text, now))
            .await?;
        tracing::info!(comment_id = %comment.id, post_id = %post_id, "Comment added");

        Ok(comment)
    }

    pub async fn edit_comment(
        &self,
        requester: Viewer,
        post_id: Uuid,
        comment_id: Uuid,
        form: &CommentForm,
    ) -> Result<Outcome<Comment>, DomainError> {
        let mut comment = self
            .repos
            .comments
            .find_by_id(comment_id)
            .await?
            .filter(|c| c.post_id == post_id)
            .ok_or_else(|| DomainError::not_found("comment", comment_id))?;

        if !is_owner(requester, comment.author_id) {
            tracing::warn!(comment_id = %comment_id, requester = ?requester.id(), "Refused edit of another user's comment");
            return Ok(Outcome::Denied);
        }

        comment.text = form.clean().map_err(DomainError::InvalidForm)?;
        let comment = self.repos.comments.save(comment).await?;

        Ok(Outcome::Done(comment))
    }

    /// Delete a comment. The lookup itself is restricted to the requester's
    /// own comments, so anyone else gets `NotFound`.
    pub async fn delete_comment(
        &self,
        requester_id: Uuid,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Comment, DomainError> {
        let comment = self
            .repos
            .comments
            .find_owned(comment_id, post_id, requester_id)
            .await?
            .ok_or_else(|| DomainError::not_found("comment", comment_id))?;

        self.repos.comments.delete(comment.id).await?;
        tracing::info!(comment_id = %comment_id, post_id = %post_id, "Comment deleted");

        Ok(comment)
    }

    pub async fn edit_profile(&self, user_id: Uuid, form: &ProfileForm) -> Result<User, DomainError> {
        let mut user = self
            .repos
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", user_id))?;

        let cleaned = form.clean().map_err(DomainError::InvalidForm)?;

        if cleaned.username != user.username {
            let taken = self
                .repos
                .users
                .find_by_username(&cleaned.username)
                .await?
                .is_some_and(|other| other.id != user.id);
            if taken {
                let mut errors = FormErrors::default();
                errors.add("username", "A user with that username already exists.");
                return Err(DomainError::InvalidForm(errors));
            }
        }

        user.username = cleaned.username;
        user.email = cleaned.email;
        user.first_name = cleaned.first_name;
        user.last_name = cleaned.last_name;
        user.updated_at = self.now();

        Ok(self.repos.users.save(user).await?)
    }
}
