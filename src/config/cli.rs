use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the torchio binary.
#[derive(Debug, Parser)]
#[command(name = "torchio", version, about = "Markdown to HTML/PDF/DOCX conversion service")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "TORCHIO_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP service with the editor frontend.
    Serve(Box<ServeArgs>),
    /// Convert a Markdown file on disk without starting the server.
    #[command(name = "convert")]
    Convert(ConvertArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct PdfOverrides {
    /// Override the Chromium executable used for PDF printing.
    #[arg(long = "pdf-chromium-path", value_name = "PATH")]
    pub chromium_path: Option<PathBuf>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub pdf: PdfOverrides,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the directory generated exports are written to.
    #[arg(long = "exports-root", value_name = "PATH")]
    pub exports_root: Option<PathBuf>,

    /// Override how long generated exports stay downloadable.
    #[arg(long = "exports-retention-minutes", value_name = "MINUTES")]
    pub exports_retention_minutes: Option<u64>,

    /// Override the cron schedule of the export cleanup sweep.
    #[arg(long = "exports-sweep-schedule", value_name = "CRON")]
    pub exports_sweep_schedule: Option<String>,

    /// Override the maximum accepted Markdown payload in bytes.
    #[arg(long = "convert-max-content-bytes", value_name = "BYTES")]
    pub convert_max_content_bytes: Option<u64>,
}

#[derive(Debug, Args, Clone)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub pdf: PdfOverrides,

    /// Output format (html|pdf|docx).
    #[arg(long, value_name = "FORMAT", default_value = "html")]
    pub format: String,

    /// Destination path; defaults to the input path with the format extension.
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Document title; defaults to the input file stem.
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Markdown file to convert.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub input: PathBuf,
}
