use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Thematic category, managed by site operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// URL identifier, unique across categories.
    pub slug: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(title: String, description: String, slug: String, is_published: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            slug,
            is_published,
            created_at: Utc::now(),
        }
    }
}
