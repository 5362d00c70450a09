//! Cron job that removes exports past their retention window.

use std::{sync::Arc, time::Duration};

use apalis::prelude::*;
use metrics::counter;

use crate::{infra::exports::ExportStore, util::bytes::format_bytes};

const METRIC_SWEEP_REMOVED_TOTAL: &str = "torchio_sweep_removed_total";

/// Marker struct for the cron-triggered sweep job.
/// Must implement `From<chrono::DateTime<chrono::Utc>>` for apalis-cron compatibility.
#[derive(Default, Debug, Clone)]
pub struct SweepExpiredExportsJob;

impl From<chrono::DateTime<chrono::Utc>> for SweepExpiredExportsJob {
    fn from(_: chrono::DateTime<chrono::Utc>) -> Self {
        Self
    }
}

/// Context for the sweep job worker.
#[derive(Clone)]
pub struct SweepContext {
    pub exports: Arc<ExportStore>,
    pub retention: Duration,
}

/// Process the sweep job: delete exports created before the retention cutoff.
pub async fn process_sweep_exports_job(
    _job: SweepExpiredExportsJob,
    ctx: Data<SweepContext>,
) -> Result<(), apalis::prelude::Error> {
    let cutoff = time::OffsetDateTime::now_utc() - ctx.retention;
    let outcome = ctx.exports.sweep_older_than(cutoff).await;
    if outcome.removed > 0 {
        counter!(METRIC_SWEEP_REMOVED_TOTAL).increment(outcome.removed as u64);
        tracing::info!(
            removed = outcome.removed,
            reclaimed = %format_bytes(outcome.reclaimed_bytes),
            "Removed expired exports"
        );
    }
    Ok(())
}
