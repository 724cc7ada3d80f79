#![allow(dead_code)]

pub mod fixtures;
pub mod pdf_assertions;

use lopdf::Document as LopdfDocument;
use sales_report::ReportConfig;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Wrapper around a generated PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn from_path(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Self::from_bytes(std::fs::read(path)?)
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Text of a single page, 1-based like the PDF page tree.
    pub fn page_text(&self, page: u32) -> String {
        self.doc.extract_text(&[page]).unwrap_or_default()
    }
}

/// A scratch directory holding one run's input, output and chart paths.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self { dir: TempDir::new()? })
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn input(&self) -> PathBuf {
        self.path("sales_data.csv")
    }

    pub fn output(&self) -> PathBuf {
        self.path("sales_report.pdf")
    }

    pub fn chart(&self) -> PathBuf {
        self.path("sales_by_region_plot.png")
    }

    /// Writes `csv` as the input file and returns a config pointing into the workspace.
    pub fn config_with_csv(&self, csv: &str) -> std::io::Result<ReportConfig> {
        std::fs::write(self.input(), csv)?;
        Ok(ReportConfig::default()
            .with_input(self.input())
            .with_output(self.output())
            .with_chart_path(self.chart()))
    }
}
