//! Domain entities - the core business objects.

mod category;
mod comment;
mod location;
mod post;
mod user;
mod viewer;

pub use category::Category;
pub use comment::{Comment, CommentEntry};
pub use location::Location;
pub use post::{Post, PostDraft, PostEntry};
pub use user::{Author, User};
pub use viewer::Viewer;
