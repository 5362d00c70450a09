//! Native DOCX generation.
//!
//! Markdown is parsed once into an owned block model, then assembled into
//! OOXML paragraphs, numbered lists, tables, and monospace code runs. No
//! intermediate HTML is involved.

mod blocks;
mod writer;

use std::time::Instant;

use metrics::{counter, histogram};
use tracing::info;

use super::{ConversionInput, ExportError, METRIC_EXPORT_BYTES_TOTAL, METRIC_EXPORT_DURATION_MS};

/// Produces DOCX payloads from markdown input.
#[derive(Debug, Default)]
pub struct DocxExporter;

impl DocxExporter {
    pub fn new() -> Self {
        Self
    }

    pub async fn generate(&self, input: &ConversionInput) -> Result<Vec<u8>, ExportError> {
        let started_at = Instant::now();

        // Parsing and zip assembly are CPU-bound.
        let owned = input.clone();
        let bytes = tokio::task::spawn_blocking(move || {
            let blocks = blocks::parse_blocks(&owned.markdown);
            writer::write_document(&owned.title, &owned.settings, &blocks)
        })
        .await
        .map_err(|err| ExportError::Task(err.to_string()))??;

        histogram!(METRIC_EXPORT_DURATION_MS, "format" => "docx")
            .record(started_at.elapsed().as_secs_f64() * 1000.0);
        counter!(METRIC_EXPORT_BYTES_TOTAL, "format" => "docx").increment(bytes.len() as u64);
        info!(
            target = "application::export",
            op = "export::docx",
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            docx_bytes = bytes.len(),
            title = %input.title,
            "DOCX export generated"
        );

        Ok(bytes)
    }
}
