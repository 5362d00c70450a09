use thiserror::Error;

use crate::domain::document::{DocumentTitle, StyleSettings};

/// Identifies the HTML shape the caller needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    /// Styled fragment for embedding in the editor preview pane.
    Fragment,
    /// Complete standalone page, suitable for PDF printing.
    Document,
}

/// Rendering request passed into the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub target: RenderTarget,
    /// Source markdown captured from the editor or a file on disk.
    pub markdown: String,
    /// Title injected as the leading heading of the output.
    pub title: DocumentTitle,
    /// Typography baked into the emitted stylesheet.
    pub settings: StyleSettings,
}

impl RenderRequest {
    pub fn new(target: RenderTarget, markdown: impl Into<String>) -> Self {
        Self {
            target,
            markdown: markdown.into(),
            title: DocumentTitle::default(),
            settings: StyleSettings::default(),
        }
    }

    pub fn with_title(mut self, title: DocumentTitle) -> Self {
        self.title = title;
        self
    }

    pub fn with_settings(mut self, settings: StyleSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// Deterministic rendering result returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    /// Sanitised HTML ready to hand to clients.
    pub html: String,
    /// Indicates whether the output contains any fenced code blocks.
    pub contains_code: bool,
}

/// Structured errors surfaced by the rendering pipeline. These should map to a
/// generic client-facing failure without leaking implementation details.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("markdown rendering failed: {message}")]
    Markdown { message: String },
    #[error("syntax highlighting failed: {language}: {message}")]
    Highlighting { language: String, message: String },
}

/// Trait exposed by the rendering pipeline. Implementations must be pure and
/// deterministic: given the same input, they return identical outputs or errors.
pub trait RenderService: Send + Sync {
    fn render(&self, request: &RenderRequest) -> Result<RenderOutput, RenderError>;
}
