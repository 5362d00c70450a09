//! Conversion-request vocabulary: titles, typography settings, output formats.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;

/// Title rendered when a request carries no usable title text.
pub const DEFAULT_TITLE: &str = "Document";

/// Font stack applied when the client does not pick one.
pub const DEFAULT_FONT_FAMILY: &str =
    "-apple-system, BlinkMacSystemFont, 'Segoe UI', 'Roboto', sans-serif";

const MIN_FONT_SIZE: u32 = 6;
const MAX_FONT_SIZE: u32 = 96;

/// Human-readable document title.
///
/// Construction trims surrounding whitespace and falls back to
/// [`DEFAULT_TITLE`], so a title is never empty once it reaches the
/// rendering or export pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTitle(String);

impl DocumentTitle {
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self(DEFAULT_TITLE.to_string())
        } else {
            Self(trimmed.to_string())
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DocumentTitle {
    fn default() -> Self {
        Self(DEFAULT_TITLE.to_string())
    }
}

impl fmt::Display for DocumentTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Clamp a user-provided font size into the range stylesheets accept.
#[must_use]
pub fn clamp_font_size(size: u32) -> u32 {
    size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

/// Reduce a user-provided font stack to characters that are inert inside a
/// `<style>` block. An empty result falls back to [`DEFAULT_FONT_FAMILY`].
#[must_use]
pub fn sanitize_font_family(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | ',' | '\'' | '"' | '-'))
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        DEFAULT_FONT_FAMILY.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Typography applied to every conversion output.
///
/// Sizes are CSS pixels. Values arriving from the API are clamped via
/// [`clamp_font_size`] before they land here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSettings {
    pub font_family: String,
    pub h1_size: u32,
    pub h2_size: u32,
    pub h3_size: u32,
    pub p_size: u32,
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            h1_size: 24,
            h2_size: 20,
            h3_size: 16,
            p_size: 12,
        }
    }
}

/// Output formats the conversion pipeline can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Html,
    Pdf,
    Docx,
}

impl ExportFormat {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }

    /// File extension without the leading dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        self.as_str()
    }

    #[must_use]
    pub fn media_type(self) -> &'static str {
        match self {
            ExportFormat::Html => "text/html; charset=utf-8",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

impl FromStr for ExportFormat {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(ExportFormat::Html),
            "pdf" => Ok(ExportFormat::Pdf),
            "docx" => Ok(ExportFormat::Docx),
            other => Err(DomainError::validation(format!(
                "unknown export format `{other}`, expected html, pdf, or docx"
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
