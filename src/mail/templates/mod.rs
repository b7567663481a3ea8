//! Theme templates for rendered mail content
//!
//! A theme is an HTML file wrapping the message body. Rendering is literal
//! global substitution of `{{title}}`, `{{content}}` and `{{footer}}` —
//! deliberately not a general templating engine: no escaping, no nesting,
//! no control flow.

use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::RwLock;

/// Known theme names. Anything else falls back to the default.
const THEMES: &[&str] = &["paper"];

/// Default theme, also the fallback for unknown names.
const DEFAULT_THEME: &str = "paper";

/// Template loading/rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("template not found: {0}")]
    NotFound(String),

    #[error("template unreadable: {0}")]
    Unreadable(String),
}

/// Read-through cache over the theme directory.
///
/// Templates are static content, so entries live for the process lifetime
/// and a racing double-load is harmless (last writer wins).
pub struct TemplateStore {
    dir: PathBuf,
    cache: RwLock<HashMap<String, String>>,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve a requested theme name to a known one.
    pub fn resolve_theme(name: Option<&str>) -> &str {
        match name {
            Some(name) if THEMES.contains(&name) => name,
            _ => DEFAULT_THEME,
        }
    }

    /// Render `content` into the theme, substituting all three
    /// placeholder sites.
    pub async fn render(
        &self,
        theme: Option<&str>,
        title: &str,
        content: &str,
        footer: &str,
    ) -> Result<String, RenderError> {
        let template = self.load(Self::resolve_theme(theme)).await?;

        Ok(template
            .replace("{{title}}", title)
            .replace("{{content}}", content)
            .replace("{{footer}}", footer))
    }

    /// Load a theme's template text, from cache after the first use.
    async fn load(&self, name: &str) -> Result<String, RenderError> {
        if let Some(text) = self.cache.read().await.get(name) {
            return Ok(text.clone());
        }

        let path = self.dir.join(format!("{name}.html"));
        let text = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RenderError::NotFound(path.display().to_string())
            } else {
                RenderError::Unreadable(format!("{}: {}", path.display(), e))
            }
        })?;

        self.cache
            .write()
            .await
            .insert(name.to_string(), text.clone());

        Ok(text)
    }
}
