use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::Response,
    routing::get,
};

use crate::{
    application::{
        export::{DocxExporter, PdfExporter},
        render::RenderService,
    },
    infra::exports::ExportStore,
    presentation::views::{EditorTemplate, render_template_response},
};

use super::{
    api::build_api_router,
    middleware::{log_responses, set_request_context},
    store_health_response,
};

#[derive(Clone)]
pub struct AppState {
    pub render: Arc<dyn RenderService>,
    pub pdf: Arc<PdfExporter>,
    pub docx: Arc<DocxExporter>,
    pub exports: Arc<ExportStore>,
    pub max_content_bytes: u64,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(editor))
        .route("/static/{*path}", get(crate::infra::assets::serve_editor))
        .route("/_health", get(health))
        .merge(build_api_router())
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn editor() -> Response {
    render_template_response(EditorTemplate::with_defaults(), StatusCode::OK)
}

async fn health(State(state): State<AppState>) -> Response {
    store_health_response(state.exports.verify_root().await)
}
