//! Markdown rendering pipeline.
//!
//! The pipeline is intentionally kept pure: it accepts markdown input,
//! produces deterministic HTML output, and surfaces structured errors. The
//! stages run in a fixed order: bullet normalisation, comrak parsing, syntect
//! highlighting, ammonia sanitisation, and final assembly into either a
//! preview fragment or a complete printable page.

mod config;
mod highlight;
mod normalize;
mod service;
mod stylesheet;
mod types;

pub(crate) use config::default_options;
pub(crate) use normalize::normalize_markdown;
pub use service::{MarkdownRenderService, render_service};
pub use types::{RenderError, RenderOutput, RenderRequest, RenderService, RenderTarget};
