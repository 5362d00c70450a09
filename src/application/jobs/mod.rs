//! Background jobs driven by the cron scheduler.

mod sweep;

pub use sweep::{SweepContext, SweepExpiredExportsJob, process_sweep_exports_job};
