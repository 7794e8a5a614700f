use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Author;

/// Comment entity - a reply left under a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: Uuid, author_id: Uuid, text: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            text,
            created_at,
        }
    }
}

/// A comment together with its author, as shown on the detail page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentEntry {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: Author,
}
