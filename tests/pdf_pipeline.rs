#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use torchio::application::export::{DocxExporter, PdfExporter};
use torchio::application::render::{RenderService, render_service};
use torchio::infra::browser::ChromiumRenderer;
use torchio::infra::exports::ExportStore;
use torchio::infra::http::{AppState, build_router};

fn fake_chromium(dir: &Path, script: &str) -> PathBuf {
    let path = dir.join("fake-chromium.sh");
    std::fs::write(&path, script).expect("write fake browser script");
    let mut permissions = std::fs::metadata(&path)
        .expect("script metadata")
        .permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&path, permissions).expect("make script executable");
    path
}

fn test_router(exports_root: &Path, chromium: PathBuf) -> Router {
    let render: Arc<dyn RenderService> = render_service();
    let browser = Arc::new(ChromiumRenderer::new(chromium));
    build_router(AppState {
        render: render.clone(),
        pdf: Arc::new(PdfExporter::new(render, browser)),
        docx: Arc::new(DocxExporter::new()),
        exports: Arc::new(
            ExportStore::new(exports_root.to_path_buf()).expect("export store should initialise"),
        ),
        max_content_bytes: 1024 * 1024,
    })
}

async fn post_json(router: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build");
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    let value = serde_json::from_slice(&bytes).expect("body should be JSON");
    (status, value)
}

#[tokio::test]
async fn pdf_export_round_trips_through_download() {
    let script_dir = TempDir::new().expect("script dir");
    let exports_dir = TempDir::new().expect("exports dir");
    let chromium = fake_chromium(
        script_dir.path(),
        r#"#!/bin/sh
out=""
for arg in "$@"; do
  case "$arg" in
    --print-to-pdf=*) out="${arg#--print-to-pdf=}" ;;
  esac
done
printf '%%PDF-1.4 fake' > "$out"
"#,
    );
    let router = test_router(exports_dir.path(), chromium);

    let (status, body) = post_json(
        &router,
        "/api/convert/pdf",
        json!({
            "content": "# Quarterly Report\n\nNumbers went up.",
            "title": "Quarterly Report",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("PDF generated successfully"));
    let url = body["download_url"].as_str().expect("download url");

    let request = Request::builder()
        .uri(url)
        .body(Body::empty())
        .expect("request should build");
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .expect("content type header")
        .to_str()
        .expect("content type is ascii");
    assert_eq!(content_type, "application/pdf");

    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .expect("content disposition header")
        .to_str()
        .expect("disposition is ascii");
    assert!(disposition.contains("quarterly-report.pdf"));

    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    assert!(bytes.starts_with(b"%PDF"), "payload is a PDF");
}

#[tokio::test]
async fn browser_failures_surface_as_generic_export_errors() {
    let script_dir = TempDir::new().expect("script dir");
    let exports_dir = TempDir::new().expect("exports dir");
    let chromium = fake_chromium(
        script_dir.path(),
        "#!/bin/sh\necho 'render crashed' >&2\nexit 42\n",
    );
    let router = test_router(exports_dir.path(), chromium);

    let (status, body) = post_json(
        &router,
        "/api/convert/pdf",
        json!({ "content": "# Doomed" }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], json!("export_failed"));
    // The CLI stderr must never leak into the client-facing message.
    let message = body["error"]["message"].as_str().expect("error message");
    assert!(!message.contains("render crashed"));
}
