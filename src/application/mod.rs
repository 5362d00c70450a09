//! Application services layer: rendering, exports, background jobs.

pub mod error;
pub mod export;
pub mod jobs;
pub mod render;
