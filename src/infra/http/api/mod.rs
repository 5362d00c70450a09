pub mod error;
pub mod handlers;
pub mod models;

use axum::{
    Router,
    routing::{get, post},
};

use crate::infra::http::AppState;

pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .route("/api/convert/html", post(handlers::convert_html))
        .route("/api/convert/pdf", post(handlers::convert_pdf))
        .route("/api/convert/docx", post(handlers::convert_docx))
        .route("/api/download/{file_id}", get(handlers::download))
}
