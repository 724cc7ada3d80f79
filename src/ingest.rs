// src/ingest.rs
//! Loading the sales CSV and coercing its measure column.
//!
//! Loading is strict about structure (a missing file, an empty file or a broken
//! record aborts the run) and lenient about content: rows whose `Sales` value
//! is not a number are dropped during coercion without failing anything.

use crate::config::MissingKeyPolicy;
use log::{debug, info};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const REGION_COLUMN: &str = "Region";
pub const PRODUCT_COLUMN: &str = "Product";
pub const SALES_COLUMN: &str = "Sales";

const REQUIRED_COLUMNS: [&str; 3] = [REGION_COLUMN, PRODUCT_COLUMN, SALES_COLUMN];

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("data file '{path}' not found")]
    NotFound { path: PathBuf },
    #[error("data file '{path}' contains no rows")]
    EmptyInput { path: PathBuf },
    #[error("data file '{path}' is malformed: {reason}")]
    MalformedInput { path: PathBuf, reason: String },
}

impl IngestError {
    fn malformed(path: &Path, reason: impl Into<String>) -> Self {
        IngestError::MalformedInput {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// A loosely-typed cell, as read from the source.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    /// A numeric cell. The source text is kept so the value can still serve as an opaque key.
    Number { value: f64, raw: String },
    Missing,
}

impl CellValue {
    fn infer(raw: &str) -> Self {
        if raw.is_empty() {
            return CellValue::Missing;
        }
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => CellValue::Number {
                value,
                raw: raw.to_string(),
            },
            _ => CellValue::Text(raw.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// The cell as a grouping key. `None` for a missing value.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            CellValue::Number { raw, .. } => Some(raw),
            CellValue::Missing => None,
        }
    }
}

/// The table exactly as read: a header and one cell per column for every record.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    source: PathBuf,
    headers: Vec<String>,
    records: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Builds a table from in-memory text cells, applying the same checks as [`load`].
    pub fn from_rows<H: AsRef<str>, S: AsRef<str>>(
        source: impl Into<PathBuf>,
        headers: &[H],
        rows: &[Vec<S>],
    ) -> Result<Self, IngestError> {
        let source = source.into();
        let headers: Vec<String> = headers.iter().map(|h| h.as_ref().to_string()).collect();
        let mut records = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let fields: Vec<&str> = row.iter().map(|s| s.as_ref()).collect();
            records.push(build_record(&source, &headers, &fields, index + 2)?);
        }
        Self::checked(source, headers, records)
    }

    fn checked(
        source: PathBuf,
        headers: Vec<String>,
        records: Vec<Vec<CellValue>>,
    ) -> Result<Self, IngestError> {
        if records.is_empty() {
            return Err(IngestError::EmptyInput { path: source });
        }
        if let Some(missing) = REQUIRED_COLUMNS
            .iter()
            .find(|name| !headers.iter().any(|h| h == *name))
        {
            return Err(IngestError::malformed(
                &source,
                format!("required column '{}' is missing", missing),
            ));
        }
        Ok(Self {
            source,
            headers,
            records,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn records(&self) -> impl Iterator<Item = &[CellValue]> {
        self.records.iter().map(Vec::as_slice)
    }
}

fn build_record(
    source: &Path,
    headers: &[String],
    fields: &[&str],
    line: usize,
) -> Result<Vec<CellValue>, IngestError> {
    if fields.len() > headers.len() {
        return Err(IngestError::malformed(
            source,
            format!(
                "line {}: expected {} fields, found {}",
                line,
                headers.len(),
                fields.len()
            ),
        ));
    }
    let mut cells: Vec<CellValue> = fields.iter().map(|f| CellValue::infer(f)).collect();
    cells.resize(headers.len(), CellValue::Missing);
    Ok(cells)
}

/// Reads the whole CSV file at `path` into memory.
pub fn load<P: AsRef<Path>>(path: P) -> Result<RawTable, IngestError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => IngestError::NotFound {
            path: path.to_path_buf(),
        },
        _ => IngestError::malformed(path, e.to_string()),
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IngestError::malformed(path, e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(IngestError::EmptyInput {
            path: path.to_path_buf(),
        });
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| IngestError::malformed(path, e.to_string()))?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(records.len() + 2);
        let fields: Vec<&str> = record.iter().collect();
        records.push(build_record(path, &headers, &fields, line)?);
    }

    let table = RawTable::checked(path.to_path_buf(), headers, records)?;
    info!("Read {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// One row that survived coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRow {
    pub region: String,
    pub product: String,
    pub sales: f64,
}

/// The rows of a [`RawTable`] whose measure is a well-defined number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedTable {
    rows: Vec<SalesRow>,
    rows_read: usize,
}

impl ValidatedTable {
    pub fn rows(&self) -> &[SalesRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    pub fn rows_dropped(&self) -> usize {
        self.rows_read - self.rows.len()
    }
}

impl FromIterator<SalesRow> for ValidatedTable {
    fn from_iter<I: IntoIterator<Item = SalesRow>>(iter: I) -> Self {
        let rows: Vec<SalesRow> = iter.into_iter().collect();
        let rows_read = rows.len();
        Self { rows, rows_read }
    }
}

/// Keeps the rows whose `Sales` cell is numeric. Everything else is dropped silently.
pub fn coerce(table: &RawTable, policy: MissingKeyPolicy) -> ValidatedTable {
    let (Some(region_idx), Some(product_idx), Some(sales_idx)) = (
        table.column(REGION_COLUMN),
        table.column(PRODUCT_COLUMN),
        table.column(SALES_COLUMN),
    ) else {
        return ValidatedTable {
            rows: Vec::new(),
            rows_read: table.len(),
        };
    };

    let mut rows = Vec::with_capacity(table.len());
    for (index, record) in table.records().enumerate() {
        let Some(sales) = record[sales_idx].as_number() else {
            debug!(
                "Dropping row {}: {} value {:?} is not numeric",
                index + 1,
                SALES_COLUMN,
                record[sales_idx]
            );
            continue;
        };
        let region = record[region_idx].as_key();
        let product = record[product_idx].as_key();
        if policy == MissingKeyPolicy::Drop && (region.is_none() || product.is_none()) {
            debug!("Dropping row {}: blank {} or {}", index + 1, REGION_COLUMN, PRODUCT_COLUMN);
            continue;
        }
        rows.push(SalesRow {
            region: region.unwrap_or_default().to_string(),
            product: product.unwrap_or_default().to_string(),
            sales,
        });
    }

    let validated = ValidatedTable {
        rows,
        rows_read: table.len(),
    };
    if validated.rows_dropped() > 0 {
        info!(
            "Dropped {} of {} rows with unusable values",
            validated.rows_dropped(),
            validated.rows_read()
        );
    }
    validated
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load(dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, IngestError::NotFound { .. }));
    }

    #[test]
    fn zero_byte_file_is_empty_input() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "empty.csv", "");
        assert!(matches!(load(path), Err(IngestError::EmptyInput { .. })));
    }

    #[test]
    fn header_only_file_is_empty_input() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "header.csv", "Region,Product,Sales\n");
        assert!(matches!(load(path), Err(IngestError::EmptyInput { .. })));
    }

    #[test]
    fn extra_fields_are_malformed() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "wide.csv", "Region,Product,Sales\nEast,Widget,10,oops\n");
        match load(path) {
            Err(IngestError::MalformedInput { reason, .. }) => {
                assert!(reason.contains("expected 3 fields, found 4"), "{}", reason)
            }
            other => panic!("expected MalformedInput, got {:?}", other),
        }
    }

    #[test]
    fn missing_required_column_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "cols.csv", "Region,Item,Sales\nEast,Widget,10\n");
        match load(path) {
            Err(IngestError::MalformedInput { reason, .. }) => assert!(reason.contains("Product")),
            other => panic!("expected MalformedInput, got {:?}", other),
        }
    }

    #[test]
    fn short_rows_are_padded_with_missing() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "short.csv", "Region,Product,Sales\nEast,Widget\n");
        let table = load(path).unwrap();
        let record = table.records().next().unwrap();
        assert_eq!(record[2], CellValue::Missing);
    }

    #[test]
    fn cells_are_loosely_typed() {
        assert_eq!(CellValue::infer(""), CellValue::Missing);
        assert_eq!(CellValue::infer(" 12.5 ").as_number(), Some(12.5));
        assert_eq!(CellValue::infer("007").as_key(), Some("007"));
        assert_eq!(CellValue::infer("abc"), CellValue::Text("abc".into()));
        assert_eq!(CellValue::infer("NaN").as_number(), None);
        assert_eq!(CellValue::infer("inf").as_number(), None);
    }

    #[test]
    fn coercion_drops_non_numeric_sales() {
        let table = RawTable::from_rows(
            "memory",
            &["Region", "Product", "Sales"],
            &[
                vec!["East", "Widget", "100"],
                vec!["West", "Widget", "abc"],
                vec!["East", "Gadget", "50"],
            ],
        )
        .unwrap();
        let validated = coerce(&table, MissingKeyPolicy::Group);
        assert_eq!(validated.len(), 2);
        assert_eq!(validated.rows_read(), 3);
        assert_eq!(validated.rows_dropped(), 1);
        assert!(validated.rows().iter().all(|r| r.region == "East"));
    }

    #[test]
    fn all_non_numeric_yields_empty_table() {
        let table = RawTable::from_rows(
            "memory",
            &["Region", "Product", "Sales"],
            &[vec!["East", "Widget", "n/a"], vec!["West", "Gadget", ""]],
        )
        .unwrap();
        assert!(coerce(&table, MissingKeyPolicy::Group).is_empty());
    }

    #[test]
    fn blank_keys_follow_policy() {
        let table = RawTable::from_rows(
            "memory",
            &["Region", "Product", "Sales"],
            &[vec!["", "Widget", "5"], vec!["East", "Widget", "7"]],
        )
        .unwrap();

        let grouped = coerce(&table, MissingKeyPolicy::Group);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped.rows()[0].region, "");

        let dropped = coerce(&table, MissingKeyPolicy::Drop);
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped.rows()[0].region, "East");
    }

    #[test]
    fn keys_are_not_normalized() {
        let table = RawTable::from_rows(
            "memory",
            &["Region", "Product", "Sales"],
            &[vec![" east", "Widget", "1"], vec!["East", "widget", "2"]],
        )
        .unwrap();
        let validated = coerce(&table, MissingKeyPolicy::Group);
        assert_eq!(validated.rows()[0].region, " east");
        assert_eq!(validated.rows()[1].product, "widget");
    }
}
