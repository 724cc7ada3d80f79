// src/pipeline.rs
//! Runs ingestion, aggregation, charting, composition and output in order.

use crate::analysis::{ReportModel, aggregate};
use crate::chart::{BarChartRenderer, ChartRenderer};
use crate::compose::compose;
use crate::config::ReportConfig;
use crate::error::PipelineError;
use crate::ingest;
use crate::layout::{Document, DocumentInfo};
use crate::render::{RenderError, write_pdf};
use chrono::{DateTime, Local};
use log::{info, warn};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub document: Document,
    pub output: PathBuf,
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub chart_embedded: bool,
}

/// A configured report generator.
pub struct ReportPipeline {
    config: ReportConfig,
    chart_renderer: Box<dyn ChartRenderer>,
}

impl ReportPipeline {
    /// Creates a pipeline that draws charts with [`BarChartRenderer`].
    pub fn new(config: ReportConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            config,
            chart_renderer: Box::new(BarChartRenderer::new()),
        })
    }

    pub fn with_chart_renderer<R: ChartRenderer + 'static>(mut self, renderer: R) -> Self {
        self.chart_renderer = Box::new(renderer);
        self
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Reads, validates and aggregates the input, then draws the chart.
    ///
    /// A chart failure is logged and leaves `chart` empty; every other failure aborts.
    pub fn build_model(&self) -> Result<(ReportModel, ingest::ValidatedTable), PipelineError> {
        let raw = ingest::load(&self.config.input_source)?;
        let table = ingest::coerce(&raw, self.config.missing_keys);
        let aggregates = aggregate(&table)?;

        let chart = match self
            .chart_renderer
            .render(&aggregates.by_region, &self.config.chart_artifact_path)
        {
            Ok(chart) => chart,
            Err(e) => {
                warn!("Chart could not be rendered, continuing without it: {}", e);
                None
            }
        };
        Ok((ReportModel::new(aggregates, chart), table))
    }

    /// Generates the report stamped with the current local time.
    pub fn run(&self) -> Result<RunOutcome, PipelineError> {
        self.run_at(Local::now())
    }

    /// Generates the report stamped with `created`.
    ///
    /// The output file only appears once it is complete. The chart artifact is
    /// removed after a successful write and kept otherwise.
    pub fn run_at(&self, created: DateTime<Local>) -> Result<RunOutcome, PipelineError> {
        let (model, table) = self.build_model()?;
        let info = DocumentInfo {
            title: self.config.title.clone(),
            author: self.config.author.clone(),
            created,
        };
        let document = compose(&model, &info);

        let output = &self.config.output_destination;
        write_document(&document, output).map_err(|source| PipelineError::Write {
            path: output.clone(),
            source,
        })?;
        info!(
            "Report generated successfully: {} ({} page(s))",
            output.display(),
            document.page_count()
        );

        let chart_embedded = document.images().next().is_some();
        if let Some(chart) = &model.chart {
            if let Err(e) = fs::remove_file(chart.path()) {
                warn!("Failed to remove chart artifact {}: {}", chart.path().display(), e);
            }
        }

        Ok(RunOutcome {
            document,
            output: output.clone(),
            rows_read: table.rows_read(),
            rows_dropped: table.rows_dropped(),
            chart_embedded,
        })
    }
}

/// Writes `document` as PDF beside `dest` and moves it into place once complete.
pub fn write_document(document: &Document, dest: &Path) -> Result<(), RenderError> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(staged.as_file_mut());
        write_pdf(document, &mut writer)?;
        writer.flush()?;
    }
    staged.persist(dest).map_err(|e| RenderError::Io(e.error))?;
    Ok(())
}
