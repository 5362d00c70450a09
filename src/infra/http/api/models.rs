use serde::{Deserialize, Serialize};

use crate::domain::document::{
    DocumentTitle, StyleSettings, clamp_font_size, sanitize_font_family,
};

/// Body accepted by all three conversion endpoints.
#[derive(Debug, Deserialize, Serialize)]
pub struct ConvertRequest {
    pub content: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub settings: SettingsPayload,
}

impl ConvertRequest {
    pub fn document_title(&self) -> DocumentTitle {
        match &self.title {
            Some(raw) => DocumentTitle::new(raw),
            None => DocumentTitle::default(),
        }
    }
}

/// Typography settings as sent by the editor. Every field is optional;
/// omissions fall back to the defaults.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SettingsPayload {
    pub font_family: Option<String>,
    pub h1_size: Option<u32>,
    pub h2_size: Option<u32>,
    pub h3_size: Option<u32>,
    pub p_size: Option<u32>,
}

impl SettingsPayload {
    /// Validate the payload into domain settings: sizes are clamped and the
    /// font stack is stripped of markup before it reaches a stylesheet.
    pub fn into_settings(self) -> StyleSettings {
        let defaults = StyleSettings::default();
        StyleSettings {
            font_family: self
                .font_family
                .as_deref()
                .map(sanitize_font_family)
                .unwrap_or(defaults.font_family),
            h1_size: self.h1_size.map(clamp_font_size).unwrap_or(defaults.h1_size),
            h2_size: self.h2_size.map(clamp_font_size).unwrap_or(defaults.h2_size),
            h3_size: self.h3_size.map(clamp_font_size).unwrap_or(defaults.h3_size),
            p_size: self.p_size.map(clamp_font_size).unwrap_or(defaults.p_size),
        }
    }
}

/// Response for HTML preview conversions.
#[derive(Debug, Deserialize, Serialize)]
pub struct PreviewResponse {
    pub success: bool,
    pub html: String,
    pub title: String,
}

/// Response for PDF and DOCX conversions.
#[derive(Debug, Deserialize, Serialize)]
pub struct ConversionResponse {
    pub success: bool,
    pub download_url: Option<String>,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_payload_applies_defaults_and_clamps() {
        let payload = SettingsPayload {
            font_family: None,
            h1_size: Some(500),
            h2_size: None,
            h3_size: Some(1),
            p_size: None,
        };
        let settings = payload.into_settings();

        assert_eq!(settings.h1_size, 96);
        assert_eq!(settings.h2_size, 20);
        assert_eq!(settings.h3_size, 6);
        assert_eq!(settings.p_size, 12);
        assert_eq!(settings.font_family, StyleSettings::default().font_family);
    }

    #[test]
    fn font_family_is_sanitised() {
        let payload = SettingsPayload {
            font_family: Some("Georgia</style><script>".to_string()),
            ..Default::default()
        };
        let settings = payload.into_settings();

        assert!(!settings.font_family.contains('<'));
        assert!(settings.font_family.contains("Georgia"));
    }

    #[test]
    fn missing_title_falls_back_to_default() {
        let request: ConvertRequest =
            serde_json::from_str(r##"{"content": "# hi"}"##).expect("valid payload");

        assert_eq!(request.document_title().as_str(), "Document");
        assert!(request.title.is_none());
    }
}
