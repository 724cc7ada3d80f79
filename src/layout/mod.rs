//! Document model and the page-drawing primitive that builds it.

mod elements;
mod page;
mod style;
mod text;

pub use elements::{ImageData, ImageElement, LayoutElement, PositionedElement, TextElement};
pub use page::{CellFlow, CellOptions, PageCanvas};
pub use style::{FontFace, Margins, PageGeometry, PageSize, TextAlign, TextStyle, mm};
pub use text::{measure_text_width, wrap_text};

use chrono::{DateTime, Local};

/// Metadata recorded in the output file.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInfo {
    pub title: String,
    pub author: String,
    pub created: DateTime<Local>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub elements: Vec<PositionedElement>,
}

/// A fully laid-out document: every element has its final page and position.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub info: DocumentInfo,
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Visible text of one page, in placement order.
    pub fn page_text(&self, index: usize) -> Vec<&str> {
        self.pages
            .get(index)
            .map(|p| p.elements.iter().filter_map(PositionedElement::text).collect())
            .unwrap_or_default()
    }

    /// Index of the first page containing an element whose text equals `text`.
    pub fn find_page(&self, text: &str) -> Option<usize> {
        (0..self.pages.len()).find(|&i| self.page_text(i).contains(&text))
    }

    pub fn images(&self) -> impl Iterator<Item = (usize, &ImageElement)> {
        self.pages.iter().enumerate().flat_map(|(i, p)| {
            p.elements.iter().filter_map(move |e| match &e.element {
                LayoutElement::Image(img) => Some((i, img)),
                _ => None,
            })
        })
    }
}
