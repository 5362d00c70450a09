//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

#[cfg(test)]
mod tests;

use std::{net::SocketAddr, num::NonZeroU64, path::PathBuf, str::FromStr, time::Duration};

use apalis_cron::Schedule;
use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

pub use cli::{CliArgs, Command, ConvertArgs, PdfOverrides, ServeArgs, ServeOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "torchio";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_EXPORTS_ROOT: &str = "exports";
const DEFAULT_RETENTION_MINUTES: u64 = 30;
const DEFAULT_SWEEP_SCHEDULE: &str = "0 */5 * * * *";
const DEFAULT_MAX_CONTENT_BYTES: u64 = 2 * 1024 * 1024;
const DEFAULT_CHROMIUM_PATH: &str = "chromium";

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub convert: ConvertSettings,
    pub exports: ExportSettings,
    pub pdf: PdfSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub bind_addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct ConvertSettings {
    pub max_content_bytes: NonZeroU64,
}

#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub root: PathBuf,
    pub retention: Duration,
    pub sweep_schedule: Schedule,
}

#[derive(Debug, Clone)]
pub struct PdfSettings {
    pub chromium_path: PathBuf,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("TORCHIO").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Convert(args)) => raw.apply_pdf_overrides(&args.pdf),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    convert: RawConvertSettings,
    exports: RawExportSettings,
    pdf: RawPdfSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(root) = overrides.exports_root.as_ref() {
            self.exports.root = Some(root.clone());
        }
        if let Some(minutes) = overrides.exports_retention_minutes {
            self.exports.retention_minutes = Some(minutes);
        }
        if let Some(schedule) = overrides.exports_sweep_schedule.as_ref() {
            self.exports.sweep_schedule = Some(schedule.clone());
        }
        if let Some(limit) = overrides.convert_max_content_bytes {
            self.convert.max_content_bytes = Some(limit);
        }

        self.apply_pdf_overrides(&overrides.pdf);
    }

    fn apply_pdf_overrides(&mut self, overrides: &PdfOverrides) {
        if let Some(path) = overrides.chromium_path.as_ref() {
            self.pdf.chromium_path = Some(path.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            convert,
            exports,
            pdf,
        } = raw;

        let server = build_server_settings(server)?;
        let logging = build_logging_settings(logging)?;
        let convert = build_convert_settings(convert)?;
        let exports = build_export_settings(exports)?;
        let pdf = build_pdf_settings(pdf)?;

        Ok(Self {
            server,
            logging,
            convert,
            exports,
            pdf,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let bind_addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.bind_addr", reason))?;

    Ok(ServerSettings { bind_addr })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_convert_settings(convert: RawConvertSettings) -> Result<ConvertSettings, LoadError> {
    let max_content_bytes_value = convert
        .max_content_bytes
        .unwrap_or(DEFAULT_MAX_CONTENT_BYTES);
    let max_content_bytes = NonZeroU64::new(max_content_bytes_value).ok_or_else(|| {
        LoadError::invalid("convert.max_content_bytes", "must be greater than zero")
    })?;
    usize::try_from(max_content_bytes_value).map_err(|_| {
        LoadError::invalid(
            "convert.max_content_bytes",
            "value exceeds supported range for usize",
        )
    })?;

    Ok(ConvertSettings { max_content_bytes })
}

fn build_export_settings(exports: RawExportSettings) -> Result<ExportSettings, LoadError> {
    let root = exports
        .root
        .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORTS_ROOT));
    if root.as_os_str().is_empty() {
        return Err(LoadError::invalid("exports.root", "path must not be empty"));
    }

    let retention_minutes = exports
        .retention_minutes
        .unwrap_or(DEFAULT_RETENTION_MINUTES);
    if retention_minutes == 0 {
        return Err(LoadError::invalid(
            "exports.retention_minutes",
            "must be greater than zero",
        ));
    }
    let retention = Duration::from_secs(retention_minutes * 60);

    let schedule_expr = exports
        .sweep_schedule
        .unwrap_or_else(|| DEFAULT_SWEEP_SCHEDULE.to_string());
    let sweep_schedule = Schedule::from_str(schedule_expr.as_str()).map_err(|err| {
        LoadError::invalid(
            "exports.sweep_schedule",
            format!("invalid cron expression `{schedule_expr}`: {err}"),
        )
    })?;

    Ok(ExportSettings {
        root,
        retention,
        sweep_schedule,
    })
}

fn build_pdf_settings(pdf: RawPdfSettings) -> Result<PdfSettings, LoadError> {
    let chromium_path = pdf
        .chromium_path
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CHROMIUM_PATH));
    if chromium_path.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "pdf.chromium_path",
            "path must not be empty",
        ));
    }

    Ok(PdfSettings { chromium_path })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawConvertSettings {
    max_content_bytes: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawExportSettings {
    root: Option<PathBuf>,
    retention_minutes: Option<u64>,
    sweep_schedule: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawPdfSettings {
    chromium_path: Option<PathBuf>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}
