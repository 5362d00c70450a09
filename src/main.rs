use std::{process, str::FromStr, sync::Arc};

use apalis::prelude::{Monitor, WorkerBuilder, WorkerFactoryFn};
use apalis_cron::CronStream;
use torchio::{
    application::{
        error::AppError,
        export::{ConversionInput, DocxExporter, PdfExporter},
        jobs::{SweepContext, process_sweep_exports_job},
        render::{RenderRequest, RenderService, RenderTarget, render_service},
    },
    config,
    domain::document::{DocumentTitle, ExportFormat, StyleSettings},
    infra::{
        browser::ChromiumRenderer,
        error::InfraError,
        exports::ExportStore,
        http::{AppState, build_router},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Convert(args) => run_convert(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let exports = Arc::new(
        ExportStore::new(settings.exports.root.clone())
            .map_err(|err| AppError::from(InfraError::Io(err)))?,
    );

    let render: Arc<dyn RenderService> = render_service();
    let browser = Arc::new(ChromiumRenderer::new(settings.pdf.chromium_path.clone()));
    let pdf = Arc::new(PdfExporter::new(render.clone(), browser));
    let docx = Arc::new(DocxExporter::new());

    let state = AppState {
        render,
        pdf,
        docx,
        exports: exports.clone(),
        max_content_bytes: settings.convert.max_content_bytes.get(),
    };

    let monitor_handle = spawn_sweep_monitor(exports, &settings.exports);

    let result = serve_http(&settings, state).await;

    monitor_handle.abort();
    let _ = monitor_handle.await;

    result
}

fn spawn_sweep_monitor(
    exports: Arc<ExportStore>,
    settings: &config::ExportSettings,
) -> tokio::task::JoinHandle<()> {
    let sweep_ctx = SweepContext {
        exports,
        retention: settings.retention,
    };
    let sweep_worker = WorkerBuilder::new("sweep-exports-worker")
        .data(sweep_ctx)
        .backend(CronStream::new(settings.sweep_schedule.clone()))
        .build_fn(process_sweep_exports_job);

    let monitor = Monitor::new().register(sweep_worker);

    tokio::spawn(async move {
        if let Err(err) = monitor.run().await {
            error!(error = %err, "job monitor stopped");
        }
    })
}

async fn serve_http(settings: &config::Settings, state: AppState) -> Result<(), AppError> {
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.bind_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "torchio::serve",
        addr = %settings.server.bind_addr,
        "Starting HTTP server"
    );

    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn run_convert(
    settings: config::Settings,
    args: config::ConvertArgs,
) -> Result<(), AppError> {
    let format = ExportFormat::from_str(&args.format)?;

    let markdown = tokio::fs::read_to_string(&args.input)
        .await
        .map_err(|err| AppError::from(InfraError::Io(err)))?;

    let title = match args.title.as_deref() {
        Some(title) => DocumentTitle::new(title),
        None => args
            .input
            .file_stem()
            .map(|stem| DocumentTitle::new(&stem.to_string_lossy()))
            .unwrap_or_default(),
    };
    let output = args
        .output
        .unwrap_or_else(|| args.input.with_extension(format.extension()));

    info!(
        target = "torchio::convert",
        input = %args.input.display(),
        output = %output.display(),
        format = %format,
        "Starting conversion"
    );

    let input = ConversionInput::new(markdown, title, StyleSettings::default());
    let bytes = match format {
        ExportFormat::Html => {
            let request = RenderRequest::new(RenderTarget::Document, input.markdown.as_str())
                .with_title(input.title.clone())
                .with_settings(input.settings.clone());
            let rendered = render_service()
                .render(&request)
                .map_err(|err| AppError::unexpected(err.to_string()))?;
            rendered.html.into_bytes()
        }
        ExportFormat::Pdf => {
            let render: Arc<dyn RenderService> = render_service();
            let browser = Arc::new(ChromiumRenderer::new(settings.pdf.chromium_path.clone()));
            PdfExporter::new(render, browser).generate(&input).await?
        }
        ExportFormat::Docx => DocxExporter::new().generate(&input).await?,
    };

    tokio::fs::write(&output, &bytes)
        .await
        .map_err(|err| AppError::from(InfraError::Io(err)))?;

    info!(
        target = "torchio::convert",
        output = %output.display(),
        bytes = bytes.len(),
        "Conversion completed"
    );
    Ok(())
}
