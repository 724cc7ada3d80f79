// src/render/lopdf.rs

use super::{DocumentRenderer, RenderError};
use crate::layout::{
    DocumentInfo, FontFace, ImageElement, LayoutElement, Page, PageGeometry, PositionedElement, TextElement,
};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use std::collections::HashMap;
use std::io;
use std::io::Write;

const PRODUCER: &str = concat!("sales-report ", env!("CARGO_PKG_VERSION"));
const BORDER_WIDTH: f32 = 0.2;

/// An in-memory PDF renderer using the `lopdf` library.
/// It builds the document's object graph and then writes it to the output stream.
pub struct LopdfDocumentRenderer {
    document: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
    fonts: Dictionary,
    /// Image XObjects keyed by element `src`, so repeated placements share one stream.
    images: HashMap<String, (String, ObjectId)>,
    page_width: f32,
    page_height: f32,
}

impl LopdfDocumentRenderer {
    pub fn new() -> Self {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        let resources_id = document.new_object_id();
        Self {
            document,
            pages_id,
            resources_id,
            page_ids: Vec::new(),
            fonts: Dictionary::new(),
            images: HashMap::new(),
            page_width: 0.0,
            page_height: 0.0,
        }
    }

    fn image_resource(&mut self, image: &ImageElement) -> Result<String, RenderError> {
        if let Some((name, _)) = self.images.get(&image.src) {
            return Ok(name.clone());
        }
        let data = &image.data;
        let expected = data.width as usize * data.height as usize * 3;
        if data.rgb.len() != expected {
            return Err(RenderError::Image(format!(
                "'{}' has {} bytes of pixel data, expected {} for {}x{}",
                image.src,
                data.rgb.len(),
                expected,
                data.width,
                data.height
            )));
        }
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => data.width as i64,
                "Height" => data.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            compress(&data.rgb)?,
        );
        let id = self.document.add_object(stream);
        let name = format!("Im{}", self.images.len() + 1);
        self.images.insert(image.src.clone(), (name.clone(), id));
        log::debug!("Embedded image '{}' as /{}", image.src, name);
        Ok(name)
    }
}

impl Default for LopdfDocumentRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentRenderer for LopdfDocumentRenderer {
    fn begin_document(&mut self, info: &DocumentInfo, geometry: &PageGeometry) -> Result<(), RenderError> {
        self.page_width = geometry.width();
        self.page_height = geometry.height();

        for face in FontFace::ALL {
            let font_id = self.document.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => face.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            self.fonts.set(face.resource_name(), font_id);
        }

        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![],
            "Count" => 0,
        };
        self.document
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        let catalog_id = self
            .document
            .add_object(dictionary! { "Type" => "Catalog", "Pages" => self.pages_id });
        self.document.trailer.set("Root", catalog_id);

        let info_id = self.document.add_object(dictionary! {
            "Title" => Object::String(to_win_ansi(&info.title), StringFormat::Literal),
            "Author" => Object::String(to_win_ansi(&info.author), StringFormat::Literal),
            "Producer" => Object::string_literal(PRODUCER),
            "CreationDate" => Object::string_literal(info.created.format("D:%Y%m%d%H%M%S").to_string()),
        });
        self.document.trailer.set("Info", info_id);
        Ok(())
    }

    fn render_page(&mut self, page: &Page) -> Result<(), RenderError> {
        let mut page_ctx = PageContext::new(self.page_height);
        for element in &page.elements {
            match &element.element {
                LayoutElement::Image(image) => {
                    let name = self.image_resource(image)?;
                    page_ctx.draw_image(&name, element);
                }
                _ => page_ctx.draw_element(element),
            }
        }
        let content = page_ctx.finish();

        let compressed_content = compress(&content.encode()?)?;
        let content_stream = Stream::new(dictionary! {"Filter" => "FlateDecode"}, compressed_content);
        let content_id = self.document.add_object(content_stream);

        let page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), self.page_width.into(), self.page_height.into()],
            "Contents" => content_id,
            "Resources" => self.resources_id,
        };
        let page_id = self.document.add_object(page_dict);
        self.page_ids.push(page_id);
        Ok(())
    }

    fn finalize(mut self: Box<Self>, mut writer: &mut dyn io::Write) -> Result<(), RenderError> {
        let mut xobjects = Dictionary::new();
        for (name, id) in self.images.values() {
            xobjects.set(name.as_str(), *id);
        }
        let resources = dictionary! {
            "Font" => self.fonts.clone(),
            "XObject" => xobjects,
        };
        self.document
            .objects
            .insert(self.resources_id, Object::Dictionary(resources));

        if let Some(Object::Dictionary(pages_dict)) = self.document.objects.get_mut(&self.pages_id) {
            let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::from(*id)).collect();
            pages_dict.set("Kids", kids);
            pages_dict.set("Count", self.page_ids.len() as i64);
        }
        self.document.save_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

fn compress(bytes: &[u8]) -> Result<Vec<u8>, io::Error> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    encoder.finish()
}

/// Encodes `s` for the WinAnsiEncoding fonts. Characters without a code become '?'.
fn to_win_ansi(s: &str) -> Vec<u8> {
    s.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> u8 {
    match c as u32 {
        0x00..=0x7F | 0xA0..=0xFF => c as u8,
        _ => match c {
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8A,
            '‹' => 0x8B,
            'Œ' => 0x8C,
            'Ž' => 0x8E,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '•' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9A,
            '›' => 0x9B,
            'œ' => 0x9C,
            'ž' => 0x9E,
            'Ÿ' => 0x9F,
            _ => b'?',
        },
    }
}

struct PageContext {
    page_height: f32,
    content: Content,
    font: Option<(FontFace, f32)>,
}

impl PageContext {
    fn new(page_height: f32) -> Self {
        Self {
            page_height,
            content: Content { operations: vec![] },
            font: None,
        }
    }

    fn finish(self) -> Content {
        self.content
    }

    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.content.operations.push(Operation::new(operator, operands));
    }

    fn draw_element(&mut self, el: &PositionedElement) {
        match &el.element {
            LayoutElement::Text(text) | LayoutElement::Footer(text) => self.draw_text(text, el),
            LayoutElement::TableCell(text) => {
                self.draw_border(el);
                self.draw_text(text, el);
            }
            LayoutElement::PageNumberPlaceholder { template } => {
                log::warn!("Unresolved page number placeholder '{}' skipped", template);
            }
            LayoutElement::Image(_) => {}
        }
    }

    fn draw_border(&mut self, el: &PositionedElement) {
        let y = self.page_height - (el.y + el.height);
        self.op("w", vec![BORDER_WIDTH.into()]);
        self.op("re", vec![el.x.into(), y.into(), el.width.into(), el.height.into()]);
        self.op("S", vec![]);
    }

    fn draw_text(&mut self, text: &TextElement, el: &PositionedElement) {
        if text.content.trim().is_empty() {
            return;
        }
        self.op("BT", vec![]);
        let font = (el.style.face, el.style.font_size);
        if self.font != Some(font) {
            self.op("Tf", vec![font.0.resource_name().into(), font.1.into()]);
            self.font = Some(font);
        }
        // Baseline sits a little below the vertical centre of the box.
        let baseline_y = el.y + 0.5 * el.height + 0.3 * el.style.font_size;
        let pdf_y = self.page_height - baseline_y;
        self.op("Td", vec![text.text_x.into(), pdf_y.into()]);
        self.op(
            "Tj",
            vec![Object::String(to_win_ansi(&text.content), StringFormat::Literal)],
        );
        self.op("ET", vec![]);
    }

    fn draw_image(&mut self, name: &str, el: &PositionedElement) {
        let y = self.page_height - (el.y + el.height);
        self.op("q", vec![]);
        self.op(
            "cm",
            vec![
                el.width.into(),
                0.into(),
                0.into(),
                el.height.into(),
                el.x.into(),
                y.into(),
            ],
        );
        self.op("Do", vec![name.into()]);
        self.op("Q", vec![]);
    }
}
