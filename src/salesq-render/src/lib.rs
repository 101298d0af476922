//! salesq-render: charts, HTML tables and dashboard views for salesq
//!
//! Everything here reads the values produced by `salesq-core`, mostly
//! [`RankedList`](salesq_core::RankedList)s and
//! [`AggregationResult`](salesq_core::AggregationResult)s, and turns them
//! into something to look at. Nothing feeds back into aggregation.
//!
//! - [`chart`] - Format-independent chart descriptions
//! - [`svg`] - The [`Renderer`] trait and the SVG renderer
//! - [`html`] - Summary tables as HTML fragments
//! - [`dashboard`] - The summary and insights views
//! - [`export`] - Multi-chart grids written to disk

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::unnecessary_wraps,
    clippy::cast_precision_loss,
    clippy::too_many_lines
)]

pub mod chart;
pub mod dashboard;
pub mod export;
pub mod html;
pub mod svg;

#[cfg(test)]
pub(crate) mod test_support;

pub use chart::{ChartKind, ChartSpec, Orientation, Series};
pub use dashboard::{insights_view, summary_view, DashboardOptions, InsightsView, SummaryView};
pub use export::{write_artifacts, ChartGrid, ExportOptions, ExportedFiles};
pub use svg::{Renderable, Renderer, SvgRenderer};

use thiserror::Error;

/// Error types for rendering
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Core(#[from] salesq_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The chart kind cannot be drawn from the given input
    #[error("a {kind} chart cannot be drawn from {input}")]
    Unsupported {
        kind: ChartKind,
        input: &'static str,
    },
}

/// Result type for rendering
pub type Result<T> = std::result::Result<T, Error>;
