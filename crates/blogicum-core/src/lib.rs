//! # Blogicum Core
//!
//! The domain layer of the Blogicum blog.
//! Pure business logic: post visibility, publish-on-save scheduling,
//! pagination and ownership checks, plus the ports infrastructure must
//! implement. No storage, HTTP or rendering code lives here.

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod policy;
pub mod ports;
pub mod services;

pub use error::DomainError;
pub use pagination::{Page, get_page};
