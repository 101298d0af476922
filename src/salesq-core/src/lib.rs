//! salesq-core: Core library for salesq sales reporting
//!
//! This crate loads a tabular sales dataset into typed records and answers
//! every question asked of it with group-by, aggregate and sort operations
//! over the in-memory table. Results are turned into narrative text by the
//! insight formatter and the reports; chart rendering lives in
//! `salesq-render` and only ever reads what this crate produces.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use salesq_core::{loader, ops, insight};
//! use salesq_core::record::{Field, Metric};
//!
//! let table = loader::load_path("train.csv", &loader::LoadOptions::default())?;
//!
//! let by_region = ops::aggregate(&table, &[Field::Region], Metric::Sales);
//! let top = ops::top_n(&by_region, 3, ops::RankBy::Sum)?;
//!
//! for line in insight::format_ranked(&top, by_region.total(), &Default::default()) {
//!     println!("{line}");
//! }
//! # Ok::<(), salesq_core::Error>(())
//! ```
//!
//! # Architecture
//!
//! - [`record`] - Typed records, the table, grouping fields and keys
//! - [`loader`] - CSV loading and row validation
//! - [`ops`] - Aggregation engine (group-by, rankings, growth, pivots, statistics)
//! - [`insight`] - Currency, percentage and ranking formatting plus recommendations
//! - [`report`] - The key insights and overview text reports
//! - [`error`] - Error handling and result types
//!
//! Every invocation loads the table once and passes it explicitly down the
//! call chain; nothing is cached between calls.

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::too_many_lines
)]

/// Error types and handling
pub mod error;

pub mod insight;
pub mod loader;
pub mod ops;
pub mod record;
pub mod report;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types and functions
pub use crate::error::{DivisionError, Error, ParseError, ParseReason, Result};

pub use loader::{load_bytes, load_path, LoadOptions};
pub use record::{Field, GroupKey, KeyPart, Metric, Record, Table};

pub use ops::{
    aggregate, percent_of_total, pivot, top_n, year_over_year_growth, AggregationResult, RankBy,
    RankedList,
};

pub use report::{KeyInsightsReport, OverviewReport, ReportOptions};

/// Version of salesq-core
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::insight::{format_currency, format_percent, format_ranked, FormatOptions};
    pub use crate::loader::{load_bytes, load_path, LoadOptions};
    pub use crate::ops::{
        aggregate, percent_of_total, pivot, rank, top_n, year_over_year_growth, yearly_sums,
        AggregationResult, GroupBy, RankBy, RankedList,
    };
    pub use crate::record::{Field, GroupKey, Metric, Record, Table};
    pub use crate::{Error, Result};
}
