// src/render/mod.rs
use crate::layout::{Document, DocumentInfo, Page, PageGeometry};
use std::io;
use thiserror::Error;

pub mod lopdf;

pub use self::lopdf::LopdfDocumentRenderer;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("PDF generation error: {0}")]
    Pdf(String),
    #[error("Image embedding error: {0}")]
    Image(String),
}

impl From<::lopdf::Error> for RenderError {
    fn from(err: ::lopdf::Error) -> Self {
        RenderError::Pdf(err.to_string())
    }
}

/// A backend that turns laid-out pages into an output file format.
///
/// Pages are handed over in order; nothing is written to the output until
/// [`DocumentRenderer::finalize`].
pub trait DocumentRenderer {
    /// Prepares shared structures (fonts, catalog, metadata) for a new document.
    fn begin_document(&mut self, info: &DocumentInfo, geometry: &PageGeometry) -> Result<(), RenderError>;

    fn render_page(&mut self, page: &Page) -> Result<(), RenderError>;

    /// Completes the document and writes it to `writer`. Consumes the renderer.
    fn finalize(self: Box<Self>, writer: &mut dyn io::Write) -> Result<(), RenderError>;
}

/// Renders every page of `document` with `renderer` and writes the result.
pub fn render_document(
    document: &Document,
    mut renderer: Box<dyn DocumentRenderer>,
    writer: &mut dyn io::Write,
) -> Result<(), RenderError> {
    renderer.begin_document(&document.info, &document.geometry)?;
    for page in &document.pages {
        renderer.render_page(page)?;
    }
    renderer.finalize(writer)?;
    log::debug!("Rendered {} page(s)", document.page_count());
    Ok(())
}

/// Renders `document` as PDF.
pub fn write_pdf(document: &Document, writer: &mut dyn io::Write) -> Result<(), RenderError> {
    render_document(document, Box::new(LopdfDocumentRenderer::new()), writer)
}
