use std::{sync::Arc, time::Instant};

use metrics::{counter, histogram};
use tracing::info;

use crate::{
    application::render::{RenderRequest, RenderService, RenderTarget},
    infra::browser::ChromiumRenderer,
};

use super::{ConversionInput, ExportError, METRIC_EXPORT_BYTES_TOTAL, METRIC_EXPORT_DURATION_MS};

/// Renders markdown to a complete HTML page, then prints it through headless
/// Chromium.
pub struct PdfExporter {
    renderer: Arc<dyn RenderService>,
    browser: Arc<ChromiumRenderer>,
}

impl PdfExporter {
    pub fn new(renderer: Arc<dyn RenderService>, browser: Arc<ChromiumRenderer>) -> Self {
        Self { renderer, browser }
    }

    pub async fn generate(&self, input: &ConversionInput) -> Result<Vec<u8>, ExportError> {
        let started_at = Instant::now();

        let request = RenderRequest::new(RenderTarget::Document, input.markdown.as_str())
            .with_title(input.title.clone())
            .with_settings(input.settings.clone());
        let output = self.renderer.render(&request)?;

        // Chromium invocation is blocking subprocess work.
        let browser = Arc::clone(&self.browser);
        let pdf = tokio::task::spawn_blocking(move || browser.print_to_pdf(&output.html))
            .await
            .map_err(|err| ExportError::Task(err.to_string()))??;

        histogram!(METRIC_EXPORT_DURATION_MS, "format" => "pdf")
            .record(started_at.elapsed().as_secs_f64() * 1000.0);
        counter!(METRIC_EXPORT_BYTES_TOTAL, "format" => "pdf").increment(pdf.len() as u64);
        info!(
            target = "application::export",
            op = "export::pdf",
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            pdf_bytes = pdf.len(),
            title = %input.title,
            "PDF export generated"
        );

        Ok(pdf)
    }
}
