//! The two dashboard views
//!
//! Both are plain serialisable contexts: headline figures already formatted
//! for display, rendered charts and HTML tables. A web layer or the CLI's
//! JSON output can consume them as they are.

use crate::chart::{ChartKind, ChartSpec};
use crate::html::summary_table;
use crate::svg::{Renderable, Renderer};
use crate::Result;

use log::debug;
use salesq_core::insight::{format_count, format_currency, NOT_AVAILABLE};
use salesq_core::ops::{aggregate, overview, top_n, RankBy, RankedList};
use salesq_core::{Field, Metric, Table};
use serde::Serialize;

/// Listing sizes for the views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardOptions {
    /// Products in the summary view's bar chart
    pub top_products: usize,
    /// Customers and states in the insights view
    pub top_rankings: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            top_products: 10,
            top_rankings: 5,
        }
    }
}

/// Headline metrics and the four overview charts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryView {
    pub total_sales: String,
    pub total_orders: String,
    pub avg_order_value: String,
    pub unique_customers: String,
    pub category_chart: Renderable,
    pub region_chart: Renderable,
    pub monthly_chart: Renderable,
    pub top_products_chart: Renderable,
}

/// A ranked name with its raw and display amounts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedValue {
    pub name: String,
    pub sales: f64,
    pub display: String,
}

/// Grouped summary tables and the leading customers and states
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightsView {
    pub category_analysis: String,
    pub region_analysis: String,
    pub segment_analysis: String,
    pub top_customers: Vec<RankedValue>,
    pub top_states: Vec<RankedValue>,
}

/// Build View A
pub fn summary_view(
    table: &Table,
    options: &DashboardOptions,
    renderer: &dyn Renderer,
) -> Result<SummaryView> {
    let o = overview(table);

    let categories = aggregate(table, &[Field::Category], Metric::Sales);
    let category_chart = ChartSpec::from_aggregation(
        ChartKind::Pie,
        "Sales by Category",
        &categories,
        RankBy::Sum,
    )?;

    let regions = aggregate(table, &[Field::Region], Metric::Sales);
    let region_chart =
        ChartSpec::from_aggregation(ChartKind::Bar, "Sales by Region", &regions, RankBy::Sum)?
            .axis_labels("Region", "Sales");

    let months = aggregate(table, &[Field::Month], Metric::Sales);
    let monthly_chart =
        ChartSpec::from_aggregation(ChartKind::Line, "Monthly Sales Trend", &months, RankBy::Sum)?
            .axis_labels("Month", "Sales");

    let products = aggregate(table, &[Field::ProductName], Metric::Sales);
    let top_products = top_n(&products, options.top_products, RankBy::Sum)?;
    let top_products_chart = ChartSpec::from_ranked(
        ChartKind::Bar,
        format!("Top {} Products", options.top_products),
        &top_products,
    )?
    .horizontal();

    debug!("Built summary view over {} records", table.len());
    Ok(SummaryView {
        total_sales: format_currency(o.total_sales),
        total_orders: format_count(o.total_orders),
        avg_order_value: o
            .average_order_value
            .map_or_else(|| NOT_AVAILABLE.to_string(), format_currency),
        unique_customers: format_count(o.unique_customers),
        category_chart: renderer.render(&category_chart)?,
        region_chart: renderer.render(&region_chart)?,
        monthly_chart: renderer.render(&monthly_chart)?,
        top_products_chart: renderer.render(&top_products_chart)?,
    })
}

/// Build View B
pub fn insights_view(table: &Table, options: &DashboardOptions) -> Result<InsightsView> {
    let grouped = |field: Field| summary_table(&aggregate(table, &[field], Metric::Sales));
    let leaders = |field: Field| -> Result<Vec<RankedValue>> {
        let result = aggregate(table, &[field], Metric::Sales);
        Ok(ranked_values(&top_n(&result, options.top_rankings, RankBy::Sum)?))
    };

    debug!("Built insights view over {} records", table.len());
    Ok(InsightsView {
        category_analysis: grouped(Field::Category),
        region_analysis: grouped(Field::Region),
        segment_analysis: grouped(Field::Segment),
        top_customers: leaders(Field::CustomerName)?,
        top_states: leaders(Field::State)?,
    })
}

fn ranked_values(list: &RankedList) -> Vec<RankedValue> {
    list.iter()
        .map(|entry| RankedValue {
            name: entry.key.label(),
            sales: entry.value,
            display: format_currency(entry.value),
        })
        .collect()
}
