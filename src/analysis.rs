// src/analysis.rs
//! Grand total and grouped sums over a validated sales table.

use crate::chart::ChartArtifact;
use crate::ingest::{SalesRow, ValidatedTable};
use indexmap::IndexMap;
use log::info;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("no rows with a numeric sales value remain; nothing to analyze")]
    EmptyResult,
    #[error("sales sum for {scope} exceeds the representable range")]
    NonFiniteSum { scope: String },
}

/// `(key, sum)` pairs for one categorical dimension, in first-seen key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedAggregate {
    entries: Vec<(String, f64)>,
}

impl GroupedAggregate {
    /// Groups `rows` by the key `key_of` extracts, summing the sales measure.
    pub fn group_by<'a, F>(rows: &'a [SalesRow], key_of: F) -> Self
    where
        F: Fn(&'a SalesRow) -> &'a str,
    {
        let mut sums: IndexMap<&str, f64> = IndexMap::new();
        for row in rows {
            *sums.entry(key_of(row)).or_insert(0.0) += row.sales;
        }
        Self {
            entries: sums.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of every group's sum.
    pub fn sum(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for GroupedAggregate {
    /// Builds an aggregate from pre-summed pairs. Repeated keys are merged.
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut sums: IndexMap<String, f64> = IndexMap::new();
        for (key, value) in iter {
            *sums.entry(key.into()).or_insert(0.0) += value;
        }
        Self {
            entries: sums.into_iter().collect(),
        }
    }
}

/// The numbers produced by the aggregation engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates {
    pub total: f64,
    pub by_region: GroupedAggregate,
    pub by_product: GroupedAggregate,
}

/// Computes the grand total and the per-region and per-product sums.
///
/// An empty table is an `EmptyResult`, never a zero total.
pub fn aggregate(table: &ValidatedTable) -> Result<Aggregates, AnalysisError> {
    if table.is_empty() {
        return Err(AnalysisError::EmptyResult);
    }
    let rows = table.rows();
    let total: f64 = rows.iter().map(|r| r.sales).sum();
    let by_region = GroupedAggregate::group_by(rows, |r| r.region.as_str());
    let by_product = GroupedAggregate::group_by(rows, |r| r.product.as_str());
    if !total.is_finite() {
        return Err(AnalysisError::NonFiniteSum {
            scope: "all rows".to_string(),
        });
    }
    if let Some((key, _)) = by_region
        .iter()
        .chain(by_product.iter())
        .find(|(_, sum)| !sum.is_finite())
    {
        return Err(AnalysisError::NonFiniteSum {
            scope: format!("'{}'", key),
        });
    }
    info!(
        "Aggregated {} rows into {} regions and {} products",
        rows.len(),
        by_region.len(),
        by_product.len()
    );
    Ok(Aggregates {
        total,
        by_region,
        by_product,
    })
}

/// Everything the document composer needs. Built once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportModel {
    pub total: f64,
    pub by_region: GroupedAggregate,
    pub by_product: GroupedAggregate,
    pub chart: Option<ChartArtifact>,
}

impl ReportModel {
    pub fn new(aggregates: Aggregates, chart: Option<ChartArtifact>) -> Self {
        Self {
            total: aggregates.total,
            by_region: aggregates.by_region,
            by_product: aggregates.by_product,
            chart,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(region: &str, product: &str, sales: f64) -> SalesRow {
        SalesRow {
            region: region.to_string(),
            product: product.to_string(),
            sales,
        }
    }

    #[test]
    fn empty_table_is_empty_result() {
        let table = ValidatedTable::default();
        assert_eq!(aggregate(&table), Err(AnalysisError::EmptyResult));
    }

    #[test]
    fn scenario_from_mixed_rows() {
        let table: ValidatedTable = vec![row("East", "Widget", 100.0), row("East", "Gadget", 50.0)]
            .into_iter()
            .collect();
        let result = aggregate(&table).unwrap();
        assert_eq!(result.total, 150.0);
        assert_eq!(result.by_region.entries(), &[("East".to_string(), 150.0)]);
        assert_eq!(
            result.by_product.entries(),
            &[("Widget".to_string(), 100.0), ("Gadget".to_string(), 50.0)]
        );
    }

    #[test]
    fn overflowing_sums_are_rejected() {
        let table: ValidatedTable = vec![row("East", "A", 1.5e308), row("West", "A", 1.5e308)]
            .into_iter()
            .collect();
        assert!(matches!(aggregate(&table), Err(AnalysisError::NonFiniteSum { .. })));

        let cancelling: ValidatedTable = vec![
            row("East", "A", 1.5e308),
            row("West", "C", -1.5e308),
            row("East", "B", 1.5e308),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            aggregate(&cancelling),
            Err(AnalysisError::NonFiniteSum {
                scope: "'East'".to_string()
            })
        );
    }

    #[test]
    fn keys_keep_first_seen_order() {
        let table: ValidatedTable = vec![
            row("West", "B", 1.0),
            row("East", "A", 2.0),
            row("North", "B", 3.0),
            row("East", "C", 4.0),
        ]
        .into_iter()
        .collect();
        let result = aggregate(&table).unwrap();
        assert_eq!(result.by_region.keys().collect::<Vec<_>>(), ["West", "East", "North"]);
        assert_eq!(result.by_product.keys().collect::<Vec<_>>(), ["B", "A", "C"]);
        assert_eq!(result.by_region.get("East"), Some(6.0));
    }

    #[test]
    fn sums_are_conserved_and_keys_unique() {
        let regions = ["East", "West", "North", "South", ""];
        let products = ["Widget", "Gadget", "Doohickey"];
        let table: ValidatedTable = (0..200)
            .map(|i| {
                row(
                    regions[i % regions.len()],
                    products[(i * 7) % products.len()],
                    (i as f64) * 1.25 - 40.0,
                )
            })
            .collect();
        let result = aggregate(&table).unwrap();

        assert!((result.total - result.by_region.sum()).abs() < 1e-6);
        assert!((result.total - result.by_product.sum()).abs() < 1e-6);

        for agg in [&result.by_region, &result.by_product] {
            let mut keys: Vec<&str> = agg.keys().collect();
            let before = keys.len();
            keys.sort_unstable();
            keys.dedup();
            assert_eq!(keys.len(), before);
        }
        assert_eq!(result.by_region.len(), 5);
    }

    #[test]
    fn from_iter_merges_repeated_keys() {
        let agg: GroupedAggregate = vec![("a", 1.0), ("b", 2.0), ("a", 3.0)].into_iter().collect();
        assert_eq!(agg.entries(), &[("a".to_string(), 4.0), ("b".to_string(), 2.0)]);
    }
}
