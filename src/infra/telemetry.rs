use std::sync::Once;

use metrics::{Unit, describe_counter, describe_gauge, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "torchio_convert_total",
            Unit::Count,
            "Total number of conversion requests, labelled by format."
        );
        describe_counter!(
            "torchio_convert_failed_total",
            Unit::Count,
            "Total number of failed conversion requests, labelled by format."
        );
        describe_histogram!(
            "torchio_render_duration_ms",
            Unit::Milliseconds,
            "Markdown render latency in milliseconds."
        );
        describe_histogram!(
            "torchio_export_duration_ms",
            Unit::Milliseconds,
            "Export generation latency in milliseconds, labelled by format."
        );
        describe_counter!(
            "torchio_export_bytes_total",
            Unit::Bytes,
            "Total size of generated export payloads, labelled by format."
        );
        describe_gauge!(
            "torchio_export_store_entries",
            Unit::Count,
            "Current number of exports held in the store."
        );
        describe_counter!(
            "torchio_sweep_removed_total",
            Unit::Count,
            "Total number of exports removed by retention sweeps."
        );
    });
}
