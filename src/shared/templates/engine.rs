//! Template engine for HTML pages using Jinja2 syntax.
//!
//! Templates are compiled into the binary from the `templates/` directory
//! and registered once, on first use.

use minijinja::{Environment, Value};
use std::sync::OnceLock;
use thiserror::Error;

/// Global template environment
static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// (name, source) pairs for every page the service renders
const TEMPLATES: &[(&str, &str)] = &[
    (
        "layout.html",
        include_str!("../../../templates/layout.html.jinja"),
    ),
    (
        "index.html",
        include_str!("../../../templates/index.html.jinja"),
    ),
    (
        "error.html",
        include_str!("../../../templates/error.html.jinja"),
    ),
];

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();

    for (name, source) in TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::warn!("Failed to load template {}: {}", name, e);
        } else {
            tracing::debug!("Loaded template: {}", name);
        }
    }

    env
}

/// Get the global template environment
fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render a template with the given context.
///
/// Names ending in `.html` are auto-escaped.
pub fn render_template(template_name: &str, ctx: Value) -> Result<String, TemplateError> {
    let template = get_environment()
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    template
        .render(ctx)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_missing_template_is_not_found() {
        let result = render_template("nonexistent.html", context! {});
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }

    #[test]
    fn test_index_escapes_filenames() {
        let html = render_template(
            "index.html",
            context! {
                title => "File Upload",
                uploads => vec![context! {
                    id => 1,
                    filename => "<script>.txt",
                    size => 5,
                    created_at => "2024-01-01 00:00:00 UTC",
                    updated_at => "2024-01-01 00:00:00 UTC",
                }],
            },
        )
        .unwrap();

        assert!(html.contains("&lt;script&gt;.txt"));
        assert!(!html.contains("<script>.txt"));
    }

    #[test]
    fn test_index_renders_empty_listing() {
        let html = render_template(
            "index.html",
            context! { title => "File Upload", uploads => Vec::<Value>::new() },
        )
        .unwrap();

        assert!(html.contains("No files uploaded yet"));
    }

    #[test]
    fn test_error_page_shows_status_and_escaped_message() {
        let html = render_template(
            "error.html",
            context! {
                title => "Error",
                status => 400,
                reason => "Bad Request",
                message => "Invalid file id '<b>'",
            },
        )
        .unwrap();

        assert!(html.contains("400 Bad Request"));
        assert!(html.contains("&lt;b&gt;"));
        assert!(!html.contains("<b>"));
    }
}
