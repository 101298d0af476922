//! Subcommand bodies
//!
//! Each function takes the loaded table and resolved configuration and
//! returns the text to print, so `main` only dispatches and writes.

use crate::cli::{TopMetric, View};
use crate::config::Config;

use anyhow::{Context, Result};
use log::info;
use salesq_core::insight::{format_count, format_ranked, truncate_label, FormatOptions};
use salesq_core::ops::{aggregate, top_n};
use salesq_core::{load_path, Field, KeyInsightsReport, Metric, OverviewReport, Table};
use salesq_render::{insights_view, summary_view, write_artifacts, ExportedFiles, SvgRenderer};

/// Load the configured input file
pub fn load_table(config: &Config) -> Result<Table> {
    let options = config.to_load_options()?;
    let path = &config.input.path;
    let table = load_path(path, &options)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    info!("Loaded {} records from {}", table.len(), path.display());
    Ok(table)
}

pub fn report(table: &Table, config: &Config) -> Result<String> {
    Ok(KeyInsightsReport::build(table, &config.to_report_options())?.to_string())
}

pub fn overview(table: &Table, config: &Config) -> Result<String> {
    Ok(OverviewReport::build(table, &config.to_report_options())?.to_string())
}

/// Numbered top-`n` listing of the groups of `columns`
pub fn top(
    table: &Table,
    config: &Config,
    columns: &[String],
    n: usize,
    metric: TopMetric,
) -> Result<String> {
    let fields = columns
        .iter()
        .map(|c| c.parse::<Field>())
        .collect::<salesq_core::Result<Vec<_>>>()?;

    let result = aggregate(table, &fields, Metric::Sales);
    let ranked = top_n(&result, n, metric.into())?;
    let label_width = config.report.label_width;

    let heading = fields
        .iter()
        .map(|f| f.column_name())
        .collect::<Vec<_>>()
        .join(" / ");
    let title = match metric {
        TopMetric::Sales => format!("Top {n} {heading} by total sales:"),
        TopMetric::Mean => format!("Top {n} {heading} by average order value:"),
        TopMetric::Count => format!("Top {n} {heading} by number of orders:"),
    };

    let lines = match metric {
        TopMetric::Count => ranked
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let orders = result.get(&entry.key).map_or(0, |s| s.count);
                format!(
                    "{}. {}: {} orders",
                    i + 1,
                    truncate_label(&entry.key.label(), label_width),
                    format_count(orders)
                )
            })
            .collect(),
        TopMetric::Sales | TopMetric::Mean => format_ranked(
            &ranked,
            result.total(),
            &FormatOptions {
                label_width,
                show_share: matches!(metric, TopMetric::Sales),
            },
        ),
    };

    let mut out = title;
    for line in lines {
        out.push('\n');
        out.push_str(&line);
    }
    Ok(out)
}

/// A dashboard view serialized as JSON
pub fn dashboard(table: &Table, config: &Config, view: View, compact: bool) -> Result<String> {
    let options = config.to_dashboard_options();
    let value = match view {
        View::Summary => serde_json::to_value(summary_view(
            table,
            &options,
            &SvgRenderer::new(config.export.chart_width, config.export.chart_height),
        )?)?,
        View::Insights => serde_json::to_value(insights_view(table, &options)?)?,
    };

    let json = if compact {
        serde_json::to_string(&value)?
    } else {
        serde_json::to_string_pretty(&value)?
    };
    Ok(json)
}

pub fn export(table: &Table, config: &Config) -> Result<ExportedFiles> {
    let options = config.to_export_options();
    write_artifacts(table, &options)
        .with_context(|| format!("Failed to export charts to {}", options.out_dir.display()))
}
