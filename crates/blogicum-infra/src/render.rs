//! JSON rendering backend.
//!
//! HTML templates are not part of this service; pages are delivered as a
//! JSON envelope naming the template and carrying its context, which a
//! front end (or a template engine behind the same port) turns into markup.

use serde::Serialize;
use serde_json::Value;

use blogicum_core::ports::{RenderError, Renderer};

#[derive(Serialize)]
struct Envelope<'a> {
    template: &'a str,
    context: &'a Value,
}

/// Renders `{ "template": ..., "context": ... }`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, template: &str, context: &Value) -> Result<String, RenderError> {
        if template.trim().is_empty() {
            return Err(RenderError::UnknownTemplate(template.to_string()));
        }

        serde_json::to_string(&Envelope { template, context })
            .map_err(|e| RenderError::Failed(e.to_string()))
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn wraps_context_with_template_name() {
        let body = JsonRenderer
            .render("blog/index.html", &json!({ "page": 1 }))
            .unwrap();
        let value: Value = serde_json::from_str(&body).unwrap();

        assert_eq!(value["template"], "blog/index.html");
        assert_eq!(value["context"]["page"], 1);
    }

    #[test]
    fn blank_template_is_rejected() {
        assert!(matches!(
            JsonRenderer.render(" ", &Value::Null),
            Err(RenderError::UnknownTemplate(_))
        ));
    }
}
