//! Template views rendered by the HTTP layer.

pub mod views;
