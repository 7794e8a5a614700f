use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Author, Category, Location, Viewer};
use crate::policy::visibility;

/// Post entity - a blog publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub text: String,
    /// Moment the post goes (or went) public.
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    /// Opaque reference to an uploaded image.
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Field values of a post after validation and the publish-on-save decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub image: Option<String>,
}

impl Post {
    /// Create a new post.
    pub fn new(author_id: Uuid, draft: PostDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            title: draft.title,
            text: draft.text,
            pub_date: draft.pub_date,
            is_published: draft.is_published,
            category_id: draft.category_id,
            location_id: draft.location_id,
            image: draft.image,
            created_at,
        }
    }

    /// Overwrite the editable fields, keeping identity and authorship.
    pub fn apply(&mut self, draft: PostDraft) {
        self.title = draft.title;
        self.text = draft.text;
        self.pub_date = draft.pub_date;
        self.is_published = draft.is_published;
        self.category_id = draft.category_id;
        self.location_id = draft.location_id;
        self.image = draft.image;
    }
}

/// A post joined with everything a listing or detail page shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostEntry {
    #[serde(flatten)]
    pub post: Post,
    pub author: Author,
    pub category: Option<Category>,
    pub location: Option<Location>,
    pub comment_count: u64,
}

impl PostEntry {
    pub fn is_visible_to(&self, viewer: Viewer, now: DateTime<Utc>) -> bool {
        visibility::is_visible(&self.post, self.category.as_ref(), viewer, now)
    }
}
