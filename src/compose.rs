// src/compose.rs
//! Lays out the report sections onto pages.

use crate::analysis::{GroupedAggregate, ReportModel};
use crate::format::{format_amount, format_currency};
use crate::layout::{
    CellFlow, CellOptions, Document, DocumentInfo, ImageData, PageCanvas, PageGeometry, TextAlign, TextStyle, mm,
};
use std::path::Path;
use std::sync::Arc;

pub const CHART_HEADING: &str = "Sales by Region";
pub const CHART_PLACEHOLDER: &str = "Sales by Region plot could not be generated.";
pub const FOOTER_TEMPLATE: &str = "Page %p of %t";
const AMOUNT_HEADER: &str = "Total Sales";

const TITLE: TextStyle = TextStyle::bold(24.0);
const HEADING: TextStyle = TextStyle::bold(14.0);
const BODY: TextStyle = TextStyle::regular(12.0);
const BYLINE: TextStyle = TextStyle::regular(10.0);
const TABLE_HEADER: TextStyle = TextStyle::bold(10.0);
const TABLE_BODY: TextStyle = TextStyle::regular(10.0);
const FOOTER: TextStyle = TextStyle::oblique(8.0);

/// Builds the paginated report for `model`.
///
/// Never fails: a chart that is missing or cannot be decoded is replaced by a
/// line of placeholder text.
pub fn compose(model: &ReportModel, info: &DocumentInfo) -> Document {
    let mut canvas = PageCanvas::new(PageGeometry::default());
    canvas.set_footer(FOOTER_TEMPLATE, FOOTER, mm(15.0));
    canvas.add_page();

    summary_section(&mut canvas, model.total, info);
    chart_section(&mut canvas, model.chart.as_ref().map(|c| c.path()));

    if !model.by_region.is_empty() {
        canvas.add_page();
        table_section(&mut canvas, "Detailed Sales by Region", "Region", &model.by_region);
    }
    if !model.by_product.is_empty() {
        table_section(&mut canvas, "Detailed Sales by Product", "Product", &model.by_product);
    }

    let document = canvas.finish(info.clone());
    log::info!("Composed report with {} page(s)", document.page_count());
    document
}

pub fn summary_text(total: f64) -> String {
    format!(
        "This report provides an overview of sales performance. \
         The total sales across all regions and products is {}. \
         Detailed breakdowns by region and product are provided below, \
         along with a visual representation of regional sales.",
        format_currency(total)
    )
}

fn summary_section(canvas: &mut PageCanvas, total: f64, info: &DocumentInfo) {
    canvas.set_style(TITLE);
    canvas.cell(0.0, mm(10.0), &info.title, CellOptions::aligned(TextAlign::Center));
    canvas.ln(Some(mm(10.0)));

    canvas.set_style(BYLINE);
    let centered = CellOptions::aligned(TextAlign::Center);
    canvas.cell(0.0, mm(5.0), &format!("Prepared by: {}", info.author), centered);
    let date = info.created.format("%Y-%m-%d %H:%M:%S");
    canvas.cell(0.0, mm(5.0), &format!("Date: {}", date), centered);
    canvas.ln(Some(mm(15.0)));

    canvas.set_style(HEADING);
    canvas.cell(0.0, mm(10.0), "Executive Summary", CellOptions::default());
    canvas.set_style(BODY);
    canvas.multi_cell(0.0, mm(7.0), &summary_text(total), TextAlign::Left);
    canvas.ln(Some(mm(10.0)));
}

fn chart_section(canvas: &mut PageCanvas, chart: Option<&Path>) {
    let image = chart.and_then(|path| match load_chart(path) {
        Ok(data) => Some((path, data)),
        Err(e) => {
            log::warn!("Chart '{}' could not be read, using placeholder: {}", path.display(), e);
            None
        }
    });

    match image {
        Some((path, data)) => {
            canvas.set_style(HEADING);
            canvas.cell(0.0, mm(10.0), CHART_HEADING, CellOptions::default());
            let x = canvas.x() + mm(10.0);
            canvas.image(&path.to_string_lossy(), Arc::new(data), Some(x), mm(150.0));
            canvas.ln(Some(mm(10.0)));
        }
        None => {
            canvas.set_style(BODY);
            canvas.cell(0.0, mm(10.0), CHART_PLACEHOLDER, CellOptions::default());
            canvas.ln(Some(mm(5.0)));
        }
    }
}

fn load_chart(path: &Path) -> Result<ImageData, image::ImageError> {
    let rgb = image::open(path)?.to_rgb8();
    Ok(ImageData {
        width: rgb.width(),
        height: rgb.height(),
        rgb: rgb.into_raw(),
    })
}

fn table_section(canvas: &mut PageCanvas, heading: &str, key_header: &str, data: &GroupedAggregate) {
    canvas.set_style(HEADING);
    canvas.cell(0.0, mm(10.0), heading, CellOptions::default());
    canvas.ln(Some(mm(5.0)));

    let col_width = canvas.geometry().width() / 3.5;
    let row_height = mm(8.0);
    let header = CellOptions::aligned(TextAlign::Center).bordered();

    canvas.set_style(TABLE_HEADER);
    canvas.cell(col_width, row_height, key_header, header.then(CellFlow::Right));
    canvas.cell(col_width, row_height, AMOUNT_HEADER, header);

    canvas.set_style(TABLE_BODY);
    let key_cell = CellOptions::aligned(TextAlign::Left).bordered().then(CellFlow::Right);
    let amount_cell = CellOptions::aligned(TextAlign::Right).bordered();
    for (key, amount) in data.iter() {
        canvas.cell(col_width, row_height, key, key_cell);
        canvas.cell(col_width, row_height, &format_amount(amount), amount_cell);
    }
    canvas.ln(Some(mm(10.0)));
}
