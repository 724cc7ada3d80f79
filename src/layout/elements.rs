use super::style::TextStyle;
use std::sync::Arc;

/// An element with its final position on a page. Coordinates have their
/// origin at the top-left corner of the page, Y growing downwards.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionedElement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub element: LayoutElement,
    pub style: TextStyle,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LayoutElement {
    /// A single line of text inside the element box.
    Text(TextElement),
    Image(ImageElement),
    /// A bordered table cell with one line of text.
    TableCell(TextElement),
    /// A page-number line whose text is only known once layout has finished.
    /// `%p` is replaced by the page number and `%t` by the page count.
    PageNumberPlaceholder { template: String },
    /// A resolved page-number line.
    Footer(TextElement),
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextElement {
    pub content: String,
    /// Absolute X of the first glyph, after alignment inside the element box.
    pub text_x: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImageElement {
    /// Identifies the image so the renderer can share one copy between placements.
    pub src: String,
    pub data: Arc<ImageData>,
}

/// Decoded 8-bit RGB pixels, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl PositionedElement {
    /// The text a reader would see for this element, if it has any.
    pub fn text(&self) -> Option<&str> {
        match &self.element {
            LayoutElement::Text(t) | LayoutElement::TableCell(t) | LayoutElement::Footer(t) => {
                Some(&t.content)
            }
            _ => None,
        }
    }
}
