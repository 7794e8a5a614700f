//! Publication rules: who sees a post, when it goes public, who may change it.

pub mod ownership;
pub mod publication;
pub mod visibility;

pub use ownership::Outcome;
pub use publication::{Publication, publish_on_save};
pub use visibility::{is_publicly_visible, is_visible};
