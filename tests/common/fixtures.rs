use sales_report::analysis::GroupedAggregate;
use sales_report::chart::{ChartArtifact, ChartError, ChartRenderer};
use std::path::Path;

pub const HEADER: &str = "Region,Product,Sales\n";

/// North/A 100, North/B 150, South/A 200.
pub fn three_row_csv() -> String {
    format!("{}North,A,100\nNorth,B,150\nSouth,A,200\n", HEADER)
}

/// `regions` distinct regions with one sale of 10.00 each, all for product "Widget".
pub fn many_regions_csv(regions: usize) -> String {
    let mut csv = HEADER.to_string();
    for i in 0..regions {
        csv.push_str(&format!("Region {:03},Widget,10.00\n", i));
    }
    csv
}

/// A chart backend that always fails, as if the image could not be encoded.
pub struct FailingChartRenderer;

impl ChartRenderer for FailingChartRenderer {
    fn render(&self, _data: &GroupedAggregate, _dest: &Path) -> Result<Option<ChartArtifact>, ChartError> {
        Err(ChartError::InvalidSize { width: 0, height: 0 })
    }
}
