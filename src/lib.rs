//! Generates a paginated PDF sales report from a CSV of sales records.
//!
//! The run is a straight line: [`ingest`] reads and validates the table,
//! [`analysis`] sums it, [`chart`] draws the regional breakdown,
//! [`compose`] lays out the pages and [`render`] writes the PDF.
//! [`ReportPipeline`] strings the stages together.

pub mod analysis;
pub mod chart;
pub mod compose;
pub mod config;
pub mod error;
pub mod format;
pub mod ingest;
pub mod layout;
pub mod pipeline;
pub mod render;

pub use config::{MissingKeyPolicy, ReportConfig};
pub use error::PipelineError;
pub use pipeline::{ReportPipeline, RunOutcome};
