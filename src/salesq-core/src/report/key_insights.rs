use crate::error::Result;
use crate::insight::{
    format_count, format_currency, format_percent, format_ranked, format_signed_percent,
    month_label, or_not_available, truncate_label, FormatOptions, Recommendations,
    NOT_AVAILABLE,
};
use crate::ops::{
    aggregate, overview, pct_change, rank, share, top_n, yearly_sums, AggregationResult, GroupBy,
    GroupSummary, RankBy,
};
use crate::record::{Field, GroupKey, Metric, Table};

use log::debug;

use std::fmt;

use super::{Document, ReportOptions, Section, FOOTER_RULE_WIDTH};

/// Narrative business summary in a fixed section order
///
/// Overall metrics, category, regional, segment, temporal, shipping, top
/// performers and recommendations. A figure whose denominator is zero is
/// shown as `N/A` without stopping the rest of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyInsightsReport {
    document: Document,
}

impl KeyInsightsReport {
    /// Compute every section of the report over `table`
    ///
    /// Fails only when a listing size in `options` is zero.
    pub fn build(table: &Table, options: &ReportOptions) -> Result<Self> {
        let sections = vec![
            overall_section(table),
            category_section(table, options)?,
            regional_section(table, options)?,
            segment_section(table, options),
            temporal_section(table, options)?,
            shipping_section(table, options),
            top_performers_section(table, options)?,
            recommendations_section(table, options),
        ];
        debug!("Built key insights report with {} sections", sections.len());

        let rule = "=".repeat(FOOTER_RULE_WIDTH);
        Ok(Self {
            document: Document {
                title: "KEY BUSINESS INSIGHTS FROM SALES DATA ANALYSIS".to_string(),
                sections,
                footer: vec![
                    rule.clone(),
                    "ANALYSIS COMPLETE - DATA-DRIVEN INSIGHTS FOR STRATEGIC DECISIONS".to_string(),
                    rule,
                ],
            },
        })
    }

    pub fn sections(&self) -> &[Section] {
        &self.document.sections
    }

    /// The report as output lines, without trailing newlines
    pub fn lines(&self) -> Vec<String> {
        self.document.lines()
    }
}

impl fmt::Display for KeyInsightsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.document, f)
    }
}

fn grouped_with_customers(table: &Table, field: Field) -> AggregationResult {
    GroupBy::new()
        .by(field)
        .distinct(Field::CustomerName)
        .run(table)
}

/// Ranked headline per group followed by indented detail lines
fn ranked_details(
    result: &AggregationResult,
    total: f64,
    label_width: usize,
    details: impl Fn(&GroupKey, &GroupSummary) -> Vec<String>,
) -> Vec<String> {
    let ranked = rank(result, RankBy::Sum);
    let headlines = format_ranked(
        &ranked,
        total,
        &FormatOptions {
            label_width,
            show_share: true,
        },
    );

    let mut lines = Vec::new();
    for (entry, headline) in ranked.iter().zip(headlines) {
        lines.push(headline);
        if let Some(summary) = result.get(&entry.key) {
            lines.extend(
                details(&entry.key, summary)
                    .into_iter()
                    .map(|d| format!("   - {d}")),
            );
        }
    }
    lines
}

fn plain_ranking(result: &AggregationResult, n: usize, label_width: usize) -> Result<Vec<String>> {
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

fn optional_currency(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), format_currency)
}

fn overall_section(table: &Table) -> Section {
    let o = overview(table);
    let mut section = Section::new("OVERALL BUSINESS PERFORMANCE");
    section.line(format!("Total Sales Revenue: {}", format_currency(o.total_sales)));
    section.line(format!("Total Orders: {}", format_count(o.total_orders)));
    section.line(format!(
        "Average Order Value: {}",
        optional_currency(o.average_order_value)
    ));
    section.line(format!("Unique Customers: {}", format_count(o.unique_customers)));
    section.line(format!("Unique Products: {}", format_count(o.unique_products)));
    section
}

fn category_section(table: &Table, options: &ReportOptions) -> Result<Section> {
    let categories = grouped_with_customers(table, Field::Category);
    let total = categories.total();

    let mut section = Section::new("CATEGORY PERFORMANCE INSIGHTS");
    section.line("Category Rankings by Total Sales:");
    section.extend(ranked_details(&categories, total, options.label_width, |_, s| {
        vec![
            format!("Average Order Value: {}", format_currency(s.mean)),
            format!("Total Orders: {}", format_count(s.count)),
            format!("Unique Customers: {}", format_count(s.distinct.unwrap_or(0))),
        ]
    }));

    section.blank();
    section.line("TOP PERFORMING SUB-CATEGORIES:");
    let subcategories = aggregate(table, &[Field::SubCategory], Metric::Sales);
    section.extend(plain_ranking(
        &subcategories,
        options.top_subcategories,
        options.label_width,
    )?);
    Ok(section)
}

fn regional_section(table: &Table, options: &ReportOptions) -> Result<Section> {
    let regions = grouped_with_customers(table, Field::Region);
    let total = regions.total();

    let mut section = Section::new("REGIONAL PERFORMANCE INSIGHTS");
    section.line("Regional Performance Rankings:");
    section.extend(ranked_details(&regions, total, options.label_width, |_, s| {
        vec![
            format!("Average Order Value: {}", format_currency(s.mean)),
            format!(
                "Market Penetration: {} customers",
                format_count(s.distinct.unwrap_or(0))
            ),
        ]
    }));

    section.blank();
    section.line(format!("TOP {} STATES BY SALES:", options.top_states));
    let states = aggregate(table, &[Field::State], Metric::Sales);
    section.extend(plain_ranking(&states, options.top_states, options.label_width)?);
    Ok(section)
}

#[allow(clippy::cast_precision_loss)]
fn segment_section(table: &Table, options: &ReportOptions) -> Section {
    let segments = grouped_with_customers(table, Field::Segment);
    let total = segments.total();

    let mut section = Section::new("CUSTOMER SEGMENT INSIGHTS");
    section.line("Customer Segment Performance:");
    section.extend(ranked_details(&segments, total, options.label_width, |_, s| {
        let per_customer = match s.distinct {
            Some(customers) if customers > 0 => {
                format!("{:.1}", s.count as f64 / customers as f64)
            }
            _ => NOT_AVAILABLE.to_string(),
        };
        vec![
            format!("Average Order Value: {}", format_currency(s.mean)),
            format!("Average Orders per Customer: {per_customer}"),
        ]
    }));
    section
}

fn temporal_section(table: &Table, options: &ReportOptions) -> Result<Section> {
    let yearly = yearly_sums(table);
    let total: f64 = yearly.values().sum();

    let mut section = Section::new("TEMPORAL PERFORMANCE INSIGHTS");
    section.line("Year-over-Year Performance:");
    for (year, sum) in &yearly {
        let pct = or_not_available(share(*sum, total), format_percent)?;
        section.line(format!(
            "{year}: {} ({pct} of total sales)",
            format_currency(*sum)
        ));
    }

    if yearly.len() > 1 {
        section.blank();
        section.line("Year-over-Year Growth Rates:");
        let years: Vec<(&i32, &f64)> = yearly.iter().collect();
        for pair in years.windows(2) {
            let ((prev_year, prev), (curr_year, curr)) = (pair[0], pair[1]);
            let growth = or_not_available(pct_change(*prev, *curr), format_signed_percent)?;
            section.line(format!("{prev_year} to {curr_year}: {growth}"));
        }
    }

    section.blank();
    section.line(format!("TOP {} MONTHS BY SALES:", options.top_months));
    let months = aggregate(table, &[Field::Month], Metric::Sales);
    for (i, entry) in top_n(&months, options.top_months, RankBy::Sum)?
        .iter()
        .enumerate()
    {
        section.line(format!(
            "{}. {}: {}",
            i + 1,
            month_label(&entry.key),
            format_currency(entry.value)
        ));
    }
    Ok(section)
}

fn shipping_section(table: &Table, options: &ReportOptions) -> Section {
    let modes = aggregate(table, &[Field::ShipMode], Metric::Sales);
    let lead_times = aggregate(table, &[Field::ShipMode], Metric::ShipDays);

    let mut section = Section::new("SHIPPING & LOGISTICS INSIGHTS");
    section.line("Shipping Mode Performance:");
    section.extend(ranked_details(&modes, modes.total(), options.label_width, |key, s| {
        let days = lead_times
            .get(key)
            .map_or_else(|| NOT_AVAILABLE.to_string(), |l| format!("{:.1}", l.mean));
        vec![
            format!("Average Order Value: {}", format_currency(s.mean)),
            format!("Order Volume: {}", format_count(s.count)),
            format!("Average Ship Time: {days} days"),
        ]
    }));
    section
}

#[allow(clippy::cast_precision_loss)]
fn top_performers_section(table: &Table, options: &ReportOptions) -> Result<Section> {
    let mut section = Section::new("TOP PERFORMERS");

    section.line(format!("TOP {} CUSTOMERS BY SALES:", options.top_customers));
    let customers = aggregate(table, &[Field::CustomerName], Metric::Sales);
    for (i, entry) in top_n(&customers, options.top_customers, RankBy::Sum)?
        .iter()
        .enumerate()
    {
        let Some(summary) = customers.get(&entry.key) else {
            continue;
        };
        section.line(format!(
            "{}. {}: {} ({} orders, {} avg)",
            i + 1,
            truncate_label(&entry.key.label(), options.label_width),
            format_currency(summary.sum),
            format_count(summary.count),
            format_currency(summary.mean)
        ));
    }

    section.blank();
    section.line(format!("TOP {} PRODUCTS BY SALES:", options.top_products));
    let products = aggregate(table, &[Field::ProductName], Metric::Sales);
    section.extend(plain_ranking(&products, options.top_products, options.label_width)?);
    Ok(section)
}

fn recommendations_section(table: &Table, options: &ReportOptions) -> Section {
    let mut section = Section::new("KEY BUSINESS RECOMMENDATIONS");
    section.line("STRATEGIC RECOMMENDATIONS:");
    section.extend(Recommendations::from_table(table).lines(options.label_width));
    section
}
