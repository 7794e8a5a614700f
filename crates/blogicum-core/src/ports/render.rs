//! Rendering port - turns a named template and its context into a body.

use serde_json::Value;

/// Template rendering backend.
pub trait Renderer: Send + Sync {
    /// Render `template` with `context` into a response body.
    fn render(&self, template: &str, context: &Value) -> Result<String, RenderError>;

    /// MIME type of the bodies this renderer produces.
    fn content_type(&self) -> &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Rendering failed: {0}")]
    Failed(String),
}
