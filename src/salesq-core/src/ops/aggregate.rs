//! Aggregation operations for salesq
//!
//! This module provides the group-by primitive and everything built on it:
//! - Grouping by one or more record fields with sum, mean, count and
//!   distinct-count summaries
//! - Rankings and top-N selection with first-seen tie-breaking
//! - Shares of total and year-over-year growth
//! - Two-field pivots
//! - Distribution statistics over raw values
//!
//! Results keep the order in which keys were first seen in the table, so a
//! stable descending sort reproduces the tie-break order of the source data.

use crate::record::{Field, GroupKey, Metric, Table};

use indexmap::IndexMap;
use serde::Serialize;

use std::collections::HashSet;

mod group_by;
mod growth;
mod pivot;
mod ranking;
pub mod stats;


pub use group_by::{aggregate, collect_values, monthly_sums, yearly_sums, GroupBy};
pub use growth::{pct_change, year_over_year_growth, YearOverYear};
pub use pivot::{pivot, Pivot};
pub use ranking::{percent_of_total, rank, share, top_n, RankedEntry, RankedList};

/// Summary of one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    /// Sum of the metric over the group
    pub sum: f64,
    /// `sum / count`
    pub mean: f64,
    /// Number of records in the group, always at least one
    pub count: usize,
    /// Distinct values of the reference field, when one was requested
    pub distinct: Option<usize>,
}

/// Groups of a table keyed by the grouped fields' values
#[derive(Debug, Clone)]
pub struct AggregationResult {
    fields: Vec<Field>,
    metric: Metric,
    groups: IndexMap<GroupKey, GroupSummary>,
}

impl AggregationResult {
    pub(crate) fn new(
        fields: Vec<Field>,
        metric: Metric,
        groups: IndexMap<GroupKey, GroupSummary>,
    ) -> Self {
        Self {
            fields,
            metric,
            groups,
        }
    }

    /// Fields the table was grouped by
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, key: &GroupKey) -> Option<&GroupSummary> {
        self.groups.get(key)
    }

    /// Groups in first-seen order
    pub fn iter(&self) -> indexmap::map::Iter<'_, GroupKey, GroupSummary> {
        self.groups.iter()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, GroupKey, GroupSummary> {
        self.groups.keys()
    }

    /// Sum of the metric across every group
    pub fn total(&self) -> f64 {
        self.groups.values().map(|g| g.sum).sum()
    }

    /// Groups in ascending key order (years, months, dates, names)
    pub fn sorted_by_key(&self) -> Vec<(&GroupKey, &GroupSummary)> {
        let mut sorted: Vec<_> = self.groups.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        sorted
    }

    /// `(key, value)` pairs in first-seen order
    pub fn values(&self, by: RankBy) -> Vec<(GroupKey, f64)> {
        self.groups
            .iter()
            .map(|(key, summary)| (key.clone(), by.value(summary)))
            .collect()
    }
}

impl<'a> IntoIterator for &'a AggregationResult {
    type Item = (&'a GroupKey, &'a GroupSummary);
    type IntoIter = indexmap::map::Iter<'a, GroupKey, GroupSummary>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Which summary value a ranking orders by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankBy {
    #[default]
    Sum,
    Mean,
    Count,
    Distinct,
}

impl RankBy {
    #[allow(clippy::cast_precision_loss)]
    pub fn value(self, summary: &GroupSummary) -> f64 {
        match self {
            RankBy::Sum => summary.sum,
            RankBy::Mean => summary.mean,
            RankBy::Count => summary.count as f64,
            RankBy::Distinct => summary.distinct.unwrap_or(0) as f64,
        }
    }
}

/// Headline figures for a whole table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total_sales: f64,
    pub total_orders: usize,
    /// Mean sales per record; absent for an empty table
    pub average_order_value: Option<f64>,
    pub unique_customers: usize,
    pub unique_products: usize,
}

/// Compute the headline figures of `table`
pub fn overview(table: &Table) -> Overview {
    let whole = GroupBy::new()
        .distinct(Field::CustomerName)
        .run(table);
    let summary = whole.get(&GroupKey::empty());

    let unique_products = table
        .iter()
        .map(|r| r.product_name.as_str())
        .collect::<HashSet<_>>()
        .len();

    Overview {
        total_sales: whole.total(),
        total_orders: table.len(),
        average_order_value: summary.map(|s| s.mean),
        unique_customers: summary.and_then(|s| s.distinct).unwrap_or(0),
        unique_products,
    }
}
