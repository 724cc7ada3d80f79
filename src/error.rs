// src/error.rs
use crate::analysis::AnalysisError;
use crate::config::ConfigError;
use crate::ingest::IngestError;
use crate::render::RenderError;
use std::path::PathBuf;
use thiserror::Error;

/// A comprehensive error type for the whole report run.
///
/// Only conditions that stop the run are represented here. Dropped rows and a
/// missing chart are absorbed by the stages that encounter them.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Ingestion failed: {0}")]
    Ingest(#[from] IngestError),

    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Configuration is invalid: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to write document to '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: RenderError,
    },
}

impl PipelineError {
    /// Name of the stage that produced the error, used in diagnostics.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Ingest(_) => "ingestion",
            PipelineError::Analysis(_) => "aggregation",
            PipelineError::Config(_) => "configuration",
            PipelineError::Write { .. } => "document output",
        }
    }
}
