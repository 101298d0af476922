use crate::error::Result;
use crate::insight::{
    format_count, format_currency, format_ranked, month_label, FormatOptions, NOT_AVAILABLE,
};
use crate::ops::stats::describe;
use crate::ops::{aggregate, overview, top_n, AggregationResult, RankBy};
use crate::record::{Field, Metric, Table};

use log::debug;

use std::collections::HashSet;
use std::fmt;

use super::{summary_table, Document, ReportOptions, Section};

/// Exploratory pass over the whole dataset
///
/// Shape and columns, data quality, headline metrics, grouped tables for
/// category, region, segment and ship mode, the leading sub-categories,
/// states, customers and products, sums by year and month, and the
/// distribution of individual sales.
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewReport {
    document: Document,
}

impl OverviewReport {
    /// Compute every section of the report over `table`
    pub fn build(table: &Table, options: &ReportOptions) -> Result<Self> {
        let sections = vec![
            shape_section(table),
            quality_section(table),
            performance_section(table),
            category_section(table, options)?,
            regional_section(table, options)?,
            grouped_section(
                "CUSTOMER SEGMENT ANALYSIS",
                "Sales by Customer Segment:",
                table,
                Field::Segment,
                options,
            ),
            temporal_section(table),
            grouped_section(
                "SHIPPING MODE ANALYSIS",
                "Sales by Shipping Mode:",
                table,
                Field::ShipMode,
                options,
            ),
            leaders_section(table, options)?,
            distribution_section(table),
        ];
        debug!("Built overview report with {} sections", sections.len());

        Ok(Self {
            document: Document {
                title: "SALES DATA ANALYSIS - EXPLORATORY DATA ANALYSIS".to_string(),
                sections,
                footer: vec![
                    "=== EDA COMPLETE ===".to_string(),
                    "Key insights have been generated. Run the export command for charts."
                        .to_string(),
                ],
            },
        })
    }

    pub fn sections(&self) -> &[Section] {
        &self.document.sections
    }

    pub fn lines(&self) -> Vec<String> {
        self.document.lines()
    }
}

impl fmt::Display for OverviewReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.document, f)
    }
}

fn top_lines(result: &AggregationResult, n: usize, label_width: usize) -> Result<Vec<String>> {
    let top = top_n(result, n, RankBy::Sum)?;
    Ok(format_ranked(
        &top,
        result.total(),
        &FormatOptions {
            label_width,
            show_share: false,
        },
    ))
}

fn shape_section(table: &Table) -> Section {
    let mut section = Section::new("BASIC DATA OVERVIEW");
    let columns = table.columns();

    section.line(format!("Dataset Shape: ({}, {})", table.len(), columns.len()));
    section.line(format!("Total Records: {}", format_count(table.len())));
    section.line(format!("Total Features: {}", columns.len()));
    section.blank();
    section.line("Column Names:");
    let quoted: Vec<String> = columns.iter().map(|c| format!("'{c}'")).collect();
    section.line(format!("[{}]", quoted.join(", ")));
    section
}

fn quality_section(table: &Table) -> Section {
    let mut section = Section::new("DATA QUALITY ASSESSMENT");

    section.line("Missing Values:");
    let mut any_missing = false;
    for (column, count) in table.missing_values().filter(|(_, count)| *count > 0) {
        any_missing = true;
        section.line(format!("{column}: {}", format_count(count)));
    }
    if !any_missing {
        section.line("None");
    }

    section.blank();
    let mut seen = HashSet::new();
    let duplicates = table
        .iter()
        .filter(|r| !r.row_id.is_empty() && !seen.insert(r.row_id.as_str()))
        .count();
    section.line(format!("Duplicate Row IDs: {duplicates}"));
    section
}

fn performance_section(table: &Table) -> Section {
    let o = overview(table);
    let mut section = Section::new("SALES PERFORMANCE ANALYSIS");
    section.line(format!("Total Sales: {}", format_currency(o.total_sales)));
    section.line(format!("Total Orders: {}", format_count(o.total_orders)));
    section.line(format!(
        "Average Order Value: {}",
        o.average_order_value
            .map_or_else(|| NOT_AVAILABLE.to_string(), format_currency)
    ));
    section
}

fn category_section(table: &Table, options: &ReportOptions) -> Result<Section> {
    let mut section = Section::new("CATEGORY & SUB-CATEGORY ANALYSIS");
    section.line("Sales by Category:");
    let categories = aggregate(table, &[Field::Category], Metric::Sales);
    section.extend(summary_table("Category", &categories, options.label_width));

    section.blank();
    section.line(format!("Top {} Sub-Categories by Sales:", options.overview_top));
    let subcategories = aggregate(table, &[Field::SubCategory], Metric::Sales);
    section.extend(top_lines(&subcategories, options.overview_top, options.label_width)?);
    Ok(section)
}

fn regional_section(table: &Table, options: &ReportOptions) -> Result<Section> {
    let mut section = Section::new("REGIONAL ANALYSIS");
    section.line("Sales by Region:");
    let regions = aggregate(table, &[Field::Region], Metric::Sales);
    section.extend(summary_table("Region", &regions, options.label_width));

    section.blank();
    section.line(format!("Top {} States by Sales:", options.overview_top));
    let states = aggregate(table, &[Field::State], Metric::Sales);
    section.extend(top_lines(&states, options.overview_top, options.label_width)?);
    Ok(section)
}

fn grouped_section(
    title: &str,
    heading: &str,
    table: &Table,
    field: Field,
    options: &ReportOptions,
) -> Section {
    let mut section = Section::new(title);
    section.line(heading);
    let result = aggregate(table, &[field], Metric::Sales);
    section.extend(summary_table(field.column_name(), &result, options.label_width));
    section
}

fn temporal_section(table: &Table) -> Section {
    let mut section = Section::new("TEMPORAL ANALYSIS");

    section.line("Sales by Year:");
    let years = aggregate(table, &[Field::Year], Metric::Sales);
    for (key, summary) in years.sorted_by_key() {
        section.line(format!("{key}: {}", format_currency(summary.sum)));
    }

    section.blank();
    section.line("Sales by Month:");
    let months = aggregate(table, &[Field::Month], Metric::Sales);
    for (key, summary) in months.sorted_by_key() {
        section.line(format!("{}: {}", month_label(key), format_currency(summary.sum)));
    }
    section
}

fn leaders_section(table: &Table, options: &ReportOptions) -> Result<Section> {
    let mut section = Section::new("TOP CUSTOMERS AND PRODUCTS");

    section.line(format!("Top {} Customers by Sales:", options.overview_top));
    let customers = aggregate(table, &[Field::CustomerName], Metric::Sales);
    section.extend(top_lines(&customers, options.overview_top, options.label_width)?);

    section.blank();
    section.line(format!("Top {} Products by Sales:", options.overview_top));
    let products = aggregate(table, &[Field::ProductName], Metric::Sales);
    section.extend(top_lines(&products, options.overview_top, options.label_width)?);
    Ok(section)
}

fn distribution_section(table: &Table) -> Section {
    let mut section = Section::new("SALES DISTRIBUTION ANALYSIS");
    let sales: Vec<f64> = table.iter().map(|r| r.sales).collect();

    let Some(d) = describe(&sales) else {
        section.line("No sales recorded");
        return section;
    };

    section.line("Sales Statistics:");
    section.line(format!("Minimum Sale: {}", format_currency(d.min)));
    section.line(format!("Maximum Sale: {}", format_currency(d.max)));
    section.line(format!("Median Sale: {}", format_currency(d.median)));
    section.line(format!(
        "Standard Deviation: {}",
        d.std_dev
            .map_or_else(|| NOT_AVAILABLE.to_string(), format_currency)
    ));

    section.blank();
    section.line("Sales Quartiles:");
    section.line(format!("25th Percentile: {}", format_currency(d.q1)));
    section.line(format!("50th Percentile: {}", format_currency(d.median)));
    section.line(format!("75th Percentile: {}", format_currency(d.q3)));
    section
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::REQUIRED_COLUMNS;
    use crate::test_support::{sale, store, table};

    fn section<'a>(report: &'a OverviewReport, title: &str) -> &'a Section {
        report
            .sections()
            .iter()
            .find(|s| s.title == title)
            .unwrap()
    }

    #[test]
    fn test_sections() {
        let report = OverviewReport::build(&store(), &ReportOptions::default()).unwrap();
        assert_eq!(report.sections().len(), 10);
        assert_eq!(report.lines()[0], "=== SALES DATA ANALYSIS - EXPLORATORY DATA ANALYSIS ===");
        assert_eq!(
            report.lines().last().unwrap(),
            "Key insights have been generated. Run the export command for charts."
        );

        let shape = section(&report, "BASIC DATA OVERVIEW");
        assert_eq!(shape.lines[0], format!("Dataset Shape: (7, {})", REQUIRED_COLUMNS.len()));
    }

    #[test]
    fn test_quality_section() {
        let t = table(vec![
            sale("A", 1.0).sub_category(""),
            sale("A", 2.0).sub_category("Paper"),
        ]);
        let report = OverviewReport::build(&t, &ReportOptions::default()).unwrap();
        let quality = section(&report, "DATA QUALITY ASSESSMENT");
        // Fixture rows carry no row id
        assert_eq!(quality.lines[1], "Row ID: 2");
        assert_eq!(quality.lines[2], "Sub-Category: 1");
        assert!(quality.lines.contains(&"Duplicate Row IDs: 0".to_string()));
    }

    #[test]
    fn test_quality_section_reports_unread_columns() {
        let mut columns: Vec<String> = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
        columns.push("Postal Code".to_string());
        let mut missing = vec![0; REQUIRED_COLUMNS.len()];
        missing.push(11);

        let records = store().records().to_vec();
        let t = Table::new(records, columns).with_missing(missing);
        let report = OverviewReport::build(&t, &ReportOptions::default()).unwrap();
        let quality = section(&report, "DATA QUALITY ASSESSMENT");
        assert_eq!(quality.lines[..2], ["Missing Values:", "Postal Code: 11"]);
    }

    #[test]
    fn test_temporal_in_key_order() {
        let report = OverviewReport::build(&store(), &ReportOptions::default()).unwrap();
        let temporal = section(&report, "TEMPORAL ANALYSIS");
        assert_eq!(
            temporal.lines,
            vec![
                "Sales by Year:",
                "2015: $1,700.00",
                "2016: $1,280.00",
                "2017: $1,520.00",
                "",
                "Sales by Month:",
                "Jan: $80.00",
                "Feb: $20.00",
                "Mar: $500.00",
                "Jun: $300.00",
                "Nov: $3,600.00",
            ]
        );
    }

    #[test]
    fn test_distribution() {
        let report = OverviewReport::build(&store(), &ReportOptions::default()).unwrap();
        let distribution = section(&report, "SALES DISTRIBUTION ANALYSIS");
        assert_eq!(distribution.lines[1], "Minimum Sale: $20.00");
        assert_eq!(distribution.lines[2], "Maximum Sale: $1,500.00");
        assert_eq!(distribution.lines[3], "Median Sale: $500.00");

        let empty = OverviewReport::build(&Table::default(), &ReportOptions::default()).unwrap();
        let distribution = section(&empty, "SALES DISTRIBUTION ANALYSIS");
        assert_eq!(distribution.lines, vec!["No sales recorded"]);
    }
}
