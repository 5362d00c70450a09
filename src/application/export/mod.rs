//! Export generation: turning markdown into downloadable PDF and DOCX bytes.
//!
//! Exporters produce raw payloads and leave persistence to the caller, so the
//! HTTP layer can hand bytes to the export store while the CLI writes them
//! straight to a file.

mod docx;
mod pdf;

pub use docx::DocxExporter;
pub use pdf::PdfExporter;

use thiserror::Error;

pub(crate) const METRIC_EXPORT_DURATION_MS: &str = "torchio_export_duration_ms";
pub(crate) const METRIC_EXPORT_BYTES_TOTAL: &str = "torchio_export_bytes_total";

use crate::{
    application::render::RenderError,
    domain::document::{DocumentTitle, StyleSettings},
    infra::{browser::BrowserError, exports::ExportStoreError},
};

/// Everything needed to produce one export.
#[derive(Debug, Clone)]
pub struct ConversionInput {
    pub markdown: String,
    pub title: DocumentTitle,
    pub settings: StyleSettings,
}

impl ConversionInput {
    pub fn new(markdown: impl Into<String>, title: DocumentTitle, settings: StyleSettings) -> Self {
        Self {
            markdown: markdown.into(),
            title,
            settings,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Browser(#[from] BrowserError),
    #[error("docx assembly failed: {message}")]
    Docx { message: String },
    #[error(transparent)]
    Store(#[from] ExportStoreError),
    #[error("export task failed: {0}")]
    Task(String),
}
