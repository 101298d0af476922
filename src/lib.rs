//! salesq: descriptive sales statistics, text insight reports and chart exports
//!
//! This crate re-exports the workspace libraries under one name:
//!
//! - [`core`] loads the sales table, aggregates and ranks it, and builds the
//!   text reports
//! - [`render`] turns aggregation results into charts, dashboard views and
//!   SVG chart grids
//!
//! ```rust,ignore
//! use salesq::prelude::*;
//!
//! let table = load_path("train.csv", &LoadOptions::default())?;
//! let report = KeyInsightsReport::build(&table, &ReportOptions::default())?;
//! println!("{report}");
//! ```

pub use salesq_core as core;
pub use salesq_render as render;

pub use salesq_core::{Error, Result, VERSION};

/// Prelude module for convenient imports
pub mod prelude {
    pub use salesq_core::prelude::*;
    pub use salesq_core::{KeyInsightsReport, OverviewReport, ReportOptions};
    pub use salesq_render::{
        insights_view, summary_view, write_artifacts, ChartKind, ChartSpec, DashboardOptions,
        ExportOptions, Renderer, SvgRenderer,
    };
}
