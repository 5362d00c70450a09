//! torchio converts Markdown documents into styled HTML, PDF, and DOCX
//! exports and serves a small live-preview editor on top of that pipeline.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
pub mod util;
