//! Report generation: dataset serialization, templates and HTML output.
//!
//! This module provides:
//! - `serialize_dataset`: the compact JSON blob of encoded records
//! - `Template`: the bundled (or overridden) HTML shell with its placeholders
//! - `render_html` / `write_html`: composition and atomic output

pub mod dataset;
pub mod html;
pub mod template;

// Re-export key types
pub use dataset::{DatasetEntry, DecodedEntry, build_dataset, parse_dataset, serialize_dataset};
pub use html::{normalize_output_path, render_html, write_html};
pub use template::{DATA_PLACEHOLDER, GEN_TIME_PLACEHOLDER, Template};
