use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use apalis::prelude::Data;
use axum::{
    body::Body,
    http::{Method, Request, header},
};
use metrics_util::debugging::DebuggingRecorder;
use serde_json::json;
use tempfile::TempDir;
use tower::ServiceExt;

use torchio::application::export::{DocxExporter, PdfExporter};
use torchio::application::jobs::{SweepContext, SweepExpiredExportsJob, process_sweep_exports_job};
use torchio::application::render::{RenderService, render_service};
use torchio::infra::browser::ChromiumRenderer;
use torchio::infra::exports::ExportStore;
use torchio::infra::http::{AppState, build_router};

#[tokio::test]
async fn conversion_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let dir = TempDir::new().expect("temp dir");
    let exports =
        Arc::new(ExportStore::new(dir.path().to_path_buf()).expect("export store should initialise"));
    let render: Arc<dyn RenderService> = render_service();
    let browser = Arc::new(ChromiumRenderer::new(PathBuf::from(
        "/nonexistent/chromium",
    )));
    let router = build_router(AppState {
        render: render.clone(),
        pdf: Arc::new(PdfExporter::new(render, browser)),
        docx: Arc::new(DocxExporter::new()),
        exports: Arc::clone(&exports),
        max_content_bytes: 1024 * 1024,
    });

    // Preview, successful DOCX export, and a PDF export that fails on the
    // missing browser binary.
    let calls = [
        ("/api/convert/html", json!({ "content": "# Hello" })),
        ("/api/convert/docx", json!({ "content": "# Hello" })),
        ("/api/convert/pdf", json!({ "content": "# Hello" })),
    ];
    for (path, payload) in calls {
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request should build");
        let _ = router
            .clone()
            .oneshot(request)
            .await
            .expect("router should respond");
    }

    // Run a zero-retention sweep so the removal counter fires too.
    tokio::time::sleep(Duration::from_millis(5)).await;
    let ctx = SweepContext {
        exports,
        retention: Duration::ZERO,
    };
    process_sweep_exports_job(SweepExpiredExportsJob, Data::new(ctx))
        .await
        .expect("sweep job completes");

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "torchio_convert_total",
        "torchio_convert_failed_total",
        "torchio_render_duration_ms",
        "torchio_export_duration_ms",
        "torchio_export_bytes_total",
        "torchio_export_store_entries",
        "torchio_sweep_removed_total",
    ];

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
