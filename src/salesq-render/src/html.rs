//! HTML fragments for the dashboard's tabular views

use crate::chart::key_label;
use crate::svg::escape;

use salesq_core::insight::{format_count, format_currency};
use salesq_core::ops::AggregationResult;

/// `sum`, `mean` and `count` per group as a striped table, keys ascending
pub fn summary_table(result: &AggregationResult) -> String {
    let header = if result.fields().is_empty() {
        "Group".to_string()
    } else {
        result
            .fields()
            .iter()
            .map(|f| f.column_name())
            .collect::<Vec<_>>()
            .join(" / ")
    };

    let mut html = String::from("<table class=\"table table-striped\">\n");
    html.push_str("  <thead>\n    <tr>");
    for column in [header.as_str(), "Total Sales", "Avg Order Value", "Orders"] {
        html.push_str(&format!("<th>{}</th>", escape(column)));
    }
    html.push_str("</tr>\n  </thead>\n  <tbody>\n");

    for (key, summary) in result.sorted_by_key() {
        html.push_str(&format!(
            "    <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(&key_label(result.fields(), key)),
            format_currency(summary.sum),
            format_currency(summary.mean),
            format_count(summary.count)
        ));
    }

    html.push_str("  </tbody>\n</table>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sale;
    use salesq_core::ops::aggregate;
    use salesq_core::{Field, Metric, Record, Table};

    fn record(segment: &str, sales: f64) -> Record {
        Record {
            segment: segment.to_string(),
            ..sale("2016-05-01", sales)
        }
    }

    #[test]
    fn test_summary_table_rows_in_key_order() {
        let table = Table::from_records(vec![
            record("Home Office", 1500.0),
            record("Consumer", 200.0),
            record("Consumer", 100.0),
        ]);
        let html = summary_table(&aggregate(&table, &[Field::Segment], Metric::Sales));

        assert!(html.starts_with("<table class=\"table table-striped\">"));
        assert!(html.contains("<th>Segment</th>"));
        let consumer = html.find("<td>Consumer</td>").unwrap();
        let home = html.find("<td>Home Office</td>").unwrap();
        assert!(consumer < home);
        assert!(html.contains(
            "<tr><td>Consumer</td><td>$300.00</td><td>$150.00</td><td>2</td></tr>"
        ));
        assert!(html.contains("<td>$1,500.00</td>"));
    }

    #[test]
    fn test_labels_are_escaped() {
        let table = Table::from_records(vec![record("R&D <lab>", 1.0)]);
        let html = summary_table(&aggregate(&table, &[Field::Segment], Metric::Sales));
        assert!(html.contains("<td>R&amp;D &lt;lab&gt;</td>"));
    }
}
