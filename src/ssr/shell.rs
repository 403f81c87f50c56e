//! HTML shell template
//!
//! The shell is the static HTML document the rendered application markup
//! is spliced into. It must contain a `<div id="app"></div>` anchor (the
//! markup splice point) and a `<title></title>` placeholder (the metadata
//! splice point). The shell is split once at load time; per request only
//! the metadata splice runs.

use thiserror::Error;

/// Markup splice anchor
const APP_ANCHOR: &str = r#"<div id="app"></div>"#;

/// Metadata splice placeholder
const TITLE_PLACEHOLDER: &str = "<title></title>";

/// Errors from shell parsing
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("shell is missing the {APP_ANCHOR} anchor")]
    MissingAnchor,
    #[error("failed to read shell: {0}")]
    Io(#[from] std::io::Error),
}

/// A parsed HTML shell, split at the app anchor
#[derive(Debug, Clone)]
pub struct ShellTemplate {
    head: String,
    tail: String,
}

impl ShellTemplate {
    /// Parse a shell document, splitting at the app anchor.
    ///
    /// A shell without the anchor is rejected; a shell without the title
    /// placeholder is accepted but metadata splicing becomes a no-op.
    pub fn parse(html: &str) -> Result<Self, ShellError> {
        let (head, tail) = html.split_once(APP_ANCHOR).ok_or(ShellError::MissingAnchor)?;
        Ok(Self {
            head: head.to_string(),
            tail: tail.to_string(),
        })
    }

    /// Load and parse a shell from disk
    pub fn load(path: &std::path::Path) -> Result<Self, ShellError> {
        let html = std::fs::read_to_string(path)?;
        Self::parse(&html)
    }

    /// Shell content before the app anchor, with the rendered metadata
    /// fragments spliced in at the title placeholder.
    pub fn head_with_meta(&self, meta_html: &str) -> String {
        if self.head.contains(TITLE_PLACEHOLDER) {
            self.head.replacen(TITLE_PLACEHOLDER, meta_html, 1)
        } else {
            self.head.clone()
        }
    }

    /// Shell content after the app anchor
    pub fn tail(&self) -> &str {
        &self.tail
    }
}
