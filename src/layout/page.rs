// src/layout/page.rs
//! The page-drawing primitive: a flowing cursor over a sequence of pages.
//!
//! Callers place cells, wrapped paragraphs and images one after another. Any
//! placement that would cross the page's break trigger first starts a new
//! page, so callers never compute overflow themselves. Page-number footers are
//! placed as placeholders and resolved in [`PageCanvas::finish`], once the final
//! page count is known.

use super::elements::{ImageData, ImageElement, LayoutElement, PositionedElement, TextElement};
use super::style::{PageGeometry, TextAlign, TextStyle, mm};
use super::text::{measure_text_width, wrap_text};
use super::{Document, DocumentInfo, Page};
use std::sync::Arc;

/// Where the cursor goes after a cell has been placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CellFlow {
    /// Stay on the same line, to the right of the cell.
    Right,
    /// Move to the left margin of the next line.
    #[default]
    NextLine,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellOptions {
    pub border: bool,
    pub align: TextAlign,
    pub flow: CellFlow,
}

impl CellOptions {
    pub fn aligned(align: TextAlign) -> Self {
        Self {
            align,
            ..Self::default()
        }
    }

    pub fn bordered(mut self) -> Self {
        self.border = true;
        self
    }

    pub fn then(mut self, flow: CellFlow) -> Self {
        self.flow = flow;
        self
    }
}

#[derive(Debug, Clone)]
struct FooterLine {
    template: String,
    style: TextStyle,
    /// Distance of the footer line's top edge from the bottom of the page.
    offset_from_bottom: f32,
    height: f32,
}

/// Horizontal padding between a cell's edge and its text.
const CELL_PADDING: f32 = 2.835;

pub struct PageCanvas {
    geometry: PageGeometry,
    pages: Vec<Page>,
    x: f32,
    y: f32,
    style: TextStyle,
    last_height: f32,
    footer: Option<FooterLine>,
}

impl PageCanvas {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: Vec::new(),
            x: geometry.margins.left,
            y: geometry.margins.top,
            style: TextStyle::default(),
            last_height: 0.0,
            footer: None,
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn set_style(&mut self, style: TextStyle) {
        self.style = style;
    }

    /// Registers a page-number footer for every page, past and future.
    ///
    /// `template` may contain `%p` (page number) and `%t` (total page count).
    pub fn set_footer(&mut self, template: impl Into<String>, style: TextStyle, offset_from_bottom: f32) {
        let line = FooterLine {
            template: template.into(),
            style,
            offset_from_bottom,
            height: mm(10.0),
        };
        for page in &mut self.pages {
            page.elements.push(Self::footer_placeholder(&self.geometry, &line));
        }
        self.footer = Some(line);
    }

    fn footer_placeholder(geometry: &PageGeometry, line: &FooterLine) -> PositionedElement {
        PositionedElement {
            x: geometry.margins.left,
            y: geometry.height() - line.offset_from_bottom,
            width: geometry.content_width(),
            height: line.height,
            element: LayoutElement::PageNumberPlaceholder {
                template: line.template.clone(),
            },
            style: line.style,
        }
    }

    /// Starts a new page and moves the cursor to its top-left margin.
    pub fn add_page(&mut self) {
        let mut page = Page::default();
        if let Some(line) = &self.footer {
            page.elements.push(Self::footer_placeholder(&self.geometry, line));
        }
        self.pages.push(page);
        self.x = self.geometry.margins.left;
        self.y = self.geometry.margins.top;
        log::debug!("Started page {}", self.pages.len());
    }

    /// Makes sure `height` points fit below the cursor, breaking the page if not.
    fn reserve(&mut self, height: f32) {
        if self.pages.is_empty() {
            self.add_page();
            return;
        }
        let at_top = self.y <= self.geometry.margins.top;
        if self.y + height > self.geometry.break_trigger() && !at_top {
            let x = self.x;
            self.add_page();
            self.x = x;
        }
    }

    fn push(&mut self, element: PositionedElement) {
        if let Some(page) = self.pages.last_mut() {
            page.elements.push(element);
        }
    }

    /// Places a one-line cell. A `width` of zero extends the cell to the right margin.
    pub fn cell(&mut self, width: f32, height: f32, text: &str, options: CellOptions) {
        self.reserve(height);
        let width = if width <= 0.0 {
            self.geometry.width() - self.geometry.margins.right - self.x
        } else {
            width
        };

        let text_width = measure_text_width(text, &self.style);
        let text_x = match options.align {
            TextAlign::Left => self.x + CELL_PADDING,
            TextAlign::Center => self.x + (width - text_width) / 2.0,
            TextAlign::Right => self.x + width - CELL_PADDING - text_width,
        };
        let content = TextElement {
            content: text.to_string(),
            text_x,
        };

        if options.border || !text.is_empty() {
            let element = if options.border {
                LayoutElement::TableCell(content)
            } else {
                LayoutElement::Text(content)
            };
            self.push(PositionedElement {
                x: self.x,
                y: self.y,
                width,
                height,
                element,
                style: self.style,
            });
        }

        self.last_height = height;
        match options.flow {
            CellFlow::Right => self.x += width,
            CellFlow::NextLine => {
                self.x = self.geometry.margins.left;
                self.y += height;
            }
        }
    }

    /// Places `text` wrapped to `width`, one cell per line. Lines may continue on a new page.
    pub fn multi_cell(&mut self, width: f32, line_height: f32, text: &str, align: TextAlign) {
        if self.pages.is_empty() {
            self.add_page();
        }
        let width = if width <= 0.0 {
            self.geometry.width() - self.geometry.margins.right - self.x
        } else {
            width
        };
        let start_x = self.x;
        for line in wrap_text(text, &self.style, width - 2.0 * CELL_PADDING) {
            self.x = start_x;
            self.cell(width, line_height, &line, CellOptions::aligned(align));
        }
    }

    /// Moves to the left margin and down by `height`, or by the last cell height.
    pub fn ln(&mut self, height: Option<f32>) {
        self.x = self.geometry.margins.left;
        self.y += height.unwrap_or(self.last_height);
    }

    /// Places an image `width` points wide at `x` (or the cursor), keeping its aspect ratio.
    /// The cursor moves below the image.
    pub fn image(&mut self, src: &str, data: Arc<ImageData>, x: Option<f32>, width: f32) {
        let height = if data.width == 0 {
            0.0
        } else {
            width * data.height as f32 / data.width as f32
        };
        self.reserve(height);
        self.push(PositionedElement {
            x: x.unwrap_or(self.x),
            y: self.y,
            width,
            height,
            element: LayoutElement::Image(ImageElement {
                src: src.to_string(),
                data,
            }),
            style: self.style,
        });
        self.y += height;
    }

    /// Resolves page-number placeholders and returns the finished document.
    pub fn finish(mut self, info: DocumentInfo) -> Document {
        let total = self.pages.len();
        for (index, page) in self.pages.iter_mut().enumerate() {
            for element in &mut page.elements {
                if let LayoutElement::PageNumberPlaceholder { template } = &element.element {
                    let content = template
                        .replace("%p", &(index + 1).to_string())
                        .replace("%t", &total.to_string());
                    let text_width = measure_text_width(&content, &element.style);
                    let text_x = element.x + (element.width - text_width) / 2.0;
                    element.element = LayoutElement::Footer(TextElement { content, text_x });
                }
            }
        }
        Document {
            info,
            geometry: self.geometry,
            pages: self.pages,
        }
    }
}
