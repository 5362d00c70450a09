use crate::application::error::HttpError;
use crate::domain::document::StyleSettings;
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Initial form values shown by the editor before the user changes anything.
#[derive(Clone)]
pub struct EditorDefaults {
    pub font_family: String,
    pub h1_size: u32,
    pub h2_size: u32,
    pub h3_size: u32,
    pub p_size: u32,
}

impl From<&StyleSettings> for EditorDefaults {
    fn from(settings: &StyleSettings) -> Self {
        Self {
            font_family: settings.font_family.clone(),
            h1_size: settings.h1_size,
            h2_size: settings.h2_size,
            h3_size: settings.h3_size,
            p_size: settings.p_size,
        }
    }
}

#[derive(Template)]
#[template(path = "editor.html")]
pub struct EditorTemplate {
    pub defaults: EditorDefaults,
}

impl EditorTemplate {
    pub fn with_defaults() -> Self {
        Self {
            defaults: EditorDefaults::from(&StyleSettings::default()),
        }
    }
}
