//! Plain-text reports
//!
//! A report is a titled list of numbered sections, each a header, a rule and
//! a block of lines. [`KeyInsightsReport`] is the narrative business summary;
//! [`OverviewReport`] is the exploratory pass over the whole dataset.

use crate::insight::{format_count, format_currency, truncate_label, DEFAULT_LABEL_WIDTH};
use crate::ops::{rank, AggregationResult, RankBy};

use std::fmt;

mod key_insights;
mod overview;

pub use key_insights::KeyInsightsReport;
pub use overview::OverviewReport;

const SECTION_RULE_WIDTH: usize = 50;
const FOOTER_RULE_WIDTH: usize = 70;

/// Sizes of the ranked listings and label width used by the reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub top_subcategories: usize,
    pub top_states: usize,
    pub top_months: usize,
    pub top_customers: usize,
    pub top_products: usize,
    /// Length of every top-N listing in the overview report
    pub overview_top: usize,
    pub label_width: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_subcategories: 5,
            top_states: 5,
            top_months: 5,
            top_customers: 5,
            top_products: 5,
            overview_top: 10,
            label_width: DEFAULT_LABEL_WIDTH,
        }
    }
}

/// One numbered section of a report
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub lines: Vec<String>,
}

impl Section {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    fn extend(&mut self, lines: impl IntoIterator<Item = String>) {
        self.lines.extend(lines);
    }
}

/// Title, sections and footer laid out as text
#[derive(Debug, Clone, PartialEq)]
struct Document {
    title: String,
    sections: Vec<Section>,
    footer: Vec<String>,
}

impl Document {
    fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("=== {} ===", self.title), String::new()];

        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                lines.push(String::new());
                lines.push(String::new());
            }
            lines.push(format!("{}. {}", i + 1, section.title));
            lines.push("=".repeat(SECTION_RULE_WIDTH));
            lines.extend(section.lines.iter().cloned());
        }

        lines.push(String::new());
        lines.extend(self.footer.iter().cloned());
        lines
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Aligned table of sum, count and mean per group, largest sum first
fn summary_table(key_header: &str, result: &AggregationResult, label_width: usize) -> Vec<String> {
    let headers = [key_header, "Total_Sales", "Order_Count", "Avg_Order_Value"];
    let rows: Vec<[String; 4]> = rank(result, RankBy::Sum)
        .iter()
        .filter_map(|entry| {
            let summary = result.get(&entry.key)?;
            Some([
                truncate_label(&entry.key.label(), label_width).into_owned(),
                format_currency(summary.sum),
                format_count(summary.count),
                format_currency(summary.mean),
            ])
        })
        .collect();

    let mut widths = headers.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: [&str; 4]| {
        let mut line = format!("{:<w$}", cells[0], w = widths[0]);
        for (cell, width) in cells.iter().zip(widths).skip(1) {
            line.push_str(&format!("  {cell:>width$}"));
        }
        line
    };

    let mut lines = vec![render(headers)];
    lines.extend(rows.iter().map(|row| {
        render([
            row[0].as_str(),
            row[1].as_str(),
            row[2].as_str(),
            row[3].as_str(),
        ])
    }));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::aggregate;
    use crate::record::{Field, Metric};
    use crate::test_support::store;

    #[test]
    fn test_document_layout() {
        let mut first = Section::new("FIRST");
        first.line("a");
        let mut second = Section::new("SECOND");
        second.line("b");

        let doc = Document {
            title: "TITLE".to_string(),
            sections: vec![first, second],
            footer: vec!["done".to_string()],
        };

        let rule = "=".repeat(50);
        assert_eq!(
            doc.lines(),
            vec![
                "=== TITLE ===",
                "",
                "1. FIRST",
                rule.as_str(),
                "a",
                "",
                "",
                "2. SECOND",
                rule.as_str(),
                "b",
                "",
                "done",
            ]
        );
        assert!(doc.to_string().ends_with("done\n"));
    }

    #[test]
    fn test_summary_table() {
        let result = aggregate(&store(), &[Field::Category], Metric::Sales);
        let lines = summary_table("Category", &result, 50);

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Category         Total_Sales"));
        assert!(lines[1].starts_with("Technology "));
        assert!(lines[1].ends_with("$1,200.00"));
        assert!(lines[3].starts_with("Office Supplies"));
        // Right-aligned numeric columns share a width
        assert!(lines.iter().all(|l| l.len() == lines[0].len()));
    }
}
