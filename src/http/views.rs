//! View templates.
//!
//! A view name such as `article/show` maps to `<views_dir>/article/show.html`.
//! Templates are plain HTML with `{{key}}` placeholders, filled from a JSON
//! object and HTML-escaped. Placeholders with no matching key render empty.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

const EXTENSION: &str = "html";

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("view '{0}' not found")]
    NotFound(String),

    #[error("invalid view name '{0}'")]
    InvalidName(String),

    #[error("failed to read view '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Renders named views from a directory.
#[derive(Debug, Clone)]
pub struct Views {
    dir: PathBuf,
}

impl Views {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `name`. Names may not escape the views directory.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, ViewError> {
        let trimmed = name.trim_matches('/');
        let relative = Path::new(trimmed);
        let safe = !trimmed.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !safe {
            return Err(ViewError::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(format!("{trimmed}.{EXTENSION}")))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).map(|path| path.is_file()).unwrap_or(false)
    }

    /// Render `name` with `data` substituted into its placeholders.
    pub fn render(&self, name: &str, data: &Map<String, JsonValue>) -> Result<String, ViewError> {
        let path = self.path_for(name)?;
        let template = fs::read_to_string(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ViewError::NotFound(name.to_string()),
            _ => ViewError::Io {
                name: name.to_string(),
                source,
            },
        })?;
        Ok(fill(&template, data))
    }
}

/// Substitute `{{ key }}` placeholders.
pub fn fill(template: &str, data: &Map<String, JsonValue>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                if let Some(value) = data.get(key) {
                    out.push_str(&escape_html(&display_value(value)));
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn display_value(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
