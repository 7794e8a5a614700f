//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod clock;
mod render;
mod repository;

pub use auth::{AuthError, PasswordService, TokenClaims, TokenService};
pub use clock::Clock;
pub use render::{RenderError, Renderer};
pub use repository::{
    BaseRepository, CategoryRepository, CommentRepository, LocationRepository, PostQuery,
    PostRepository, UserRepository,
};
