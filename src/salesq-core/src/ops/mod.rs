//! Data operations for salesq
//!
//! All operations read a [`Table`](crate::record::Table) and return fresh
//! values; nothing here mutates its input or keeps state between calls.

pub mod aggregate;

pub use aggregate::{
    aggregate, collect_values, monthly_sums, overview, pct_change, percent_of_total, pivot, rank,
    share, top_n, year_over_year_growth, yearly_sums, AggregationResult, GroupBy, GroupSummary,
    Overview, Pivot, RankBy, RankedEntry, RankedList, YearOverYear,
};
pub use aggregate::stats;
