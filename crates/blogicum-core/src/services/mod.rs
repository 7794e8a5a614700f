//! Application services - request flows composed from ports and policies.

mod blog;

pub use blog::{BlogService, PostDetail, Repositories, SavedPost};
