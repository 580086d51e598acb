//! Template rendering and HTML document framing.
//!
//! DESIGN
//! ======
//! Page templates are `<name>.html` files in the template directory, loaded
//! on first use by a `minijinja` environment. Each page has a typed view
//! model implementing [`View`], so the set of variables a template can see is
//! fixed at compile time. Templates may pull in other files verbatim through
//! the `include(name)` function.
//!
//! A rendered page body is wrapped in a [`Document`] which carries the title
//! and meta tags, and is serialized by the built-in `@document` shell.

use std::path::{Path, PathBuf};

use minijinja::{AutoEscape, Environment, ErrorKind, Value, context};
use serde::Serialize;

pub const LOGIN_TEMPLATE: &str = "connexions";
pub const DASHBOARD_TEMPLATE: &str = "dashboard";
pub const PAGE_TITLE: &str = "Yoozak Rescue CMD";
pub const VIEWPORT: &str = "width=device-width, initial-scale=1";

const DOCUMENT_SHELL_NAME: &str = "@document";
const DOCUMENT_SHELL: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
{%- for tag in meta %}
    <meta name="{{ tag.name }}" content="{{ tag.content }}">
{%- endfor %}
    <title>{{ title }}</title>
  </head>
  <body>
{{ body }}
  </body>
</html>
"#;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("template not found: {0}")]
    NotFound(String),
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

// =============================================================================
// VIEW MODELS
// =============================================================================

/// A view model bound to exactly one named template.
pub trait View: Serialize {
    const TEMPLATE: &'static str;
}

/// The login page takes no bindings.
#[derive(Debug, Default, Serialize)]
pub struct LoginViewModel {}

impl View for LoginViewModel {
    const TEMPLATE: &'static str = LOGIN_TEMPLATE;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardViewModel {
    pub user: String,
    /// `None` when the user has no directory entry.
    pub role: Option<String>,
}

impl View for DashboardViewModel {
    const TEMPLATE: &'static str = DASHBOARD_TEMPLATE;
}

// =============================================================================
// DOCUMENT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaTag {
    pub name: String,
    pub content: String,
}

/// A finished page: rendered body plus head metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    pub meta: Vec<MetaTag>,
    pub body: String,
}

impl Document {
    #[must_use]
    pub fn new(body: String) -> Self {
        Self { title: String::new(), meta: Vec::new(), body }
    }

    #[must_use]
    pub fn with_title(mut self, title: &str) -> Self {
        title.clone_into(&mut self.title);
        self
    }

    #[must_use]
    pub fn with_meta_tag(mut self, name: &str, content: &str) -> Self {
        self.meta.push(MetaTag { name: name.to_owned(), content: content.to_owned() });
        self
    }
}

// =============================================================================
// RENDERER
// =============================================================================

/// Template names map to file stems; anything that could escape the template
/// directory is treated as missing.
fn is_valid_template_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

fn load_source(dir: &Path, name: &str) -> Result<Option<String>, minijinja::Error> {
    if !is_valid_template_name(name) {
        return Ok(None);
    }
    match std::fs::read_to_string(dir.join(format!("{name}.html"))) {
        Ok(source) => Ok(Some(source)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("could not read template {name:?}"),
        )
        .with_source(e)),
    }
}

pub struct TemplateRenderer {
    env: Environment<'static>,
    dir: PathBuf,
}

impl TemplateRenderer {
    /// Build a renderer reading templates from `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in document shell fails to compile.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, RenderError> {
        let dir = dir.into();
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);

        let loader_dir = dir.clone();
        env.set_loader(move |name| load_source(&loader_dir, name));

        let include_dir = dir.clone();
        env.add_function("include", move |name: String| -> Result<Value, minijinja::Error> {
            let source = load_source(&include_dir, &name)?.ok_or_else(|| {
                minijinja::Error::new(ErrorKind::TemplateNotFound, format!("template {name:?} does not exist"))
            })?;
            Ok(Value::from_safe_string(source))
        });

        env.add_template(DOCUMENT_SHELL_NAME, DOCUMENT_SHELL)?;
        Ok(Self { env, dir })
    }

    #[must_use]
    pub fn template_dir(&self) -> &Path {
        &self.dir
    }

    /// Render the template bound to `V` with the view model as its scope.
    pub fn render<V: View>(&self, view: &V) -> Result<String, RenderError> {
        let template = self.env.get_template(V::TEMPLATE).map_err(|e| match e.kind() {
            ErrorKind::TemplateNotFound => RenderError::NotFound(V::TEMPLATE.to_owned()),
            _ => RenderError::Template(e),
        })?;
        Ok(template.render(view)?)
    }

    /// Return the raw source of template `name`, unevaluated.
    pub fn include(&self, name: &str) -> Result<String, RenderError> {
        load_source(&self.dir, name)?.ok_or_else(|| RenderError::NotFound(name.to_owned()))
    }

    /// Serialize a document to a complete HTML page.
    pub fn render_document(&self, document: &Document) -> Result<String, RenderError> {
        let shell = self.env.get_template(DOCUMENT_SHELL_NAME)?;
        Ok(shell.render(context! {
            title => document.title,
            meta => document.meta,
            body => Value::from_safe_string(document.body.clone()),
        })?)
    }
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
