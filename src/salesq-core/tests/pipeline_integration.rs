use pretty_assertions::assert_eq;
use salesq_core::insight::{format_ranked, FormatOptions};
use salesq_core::ops::{aggregate, rank, top_n, RankBy};
use salesq_core::{
    load_path, Error, Field, KeyInsightsReport, LoadOptions, Metric, OverviewReport,
    ReportOptions,
};

use std::io::Write;

const HEADER: &str = "Row ID,Order ID,Order Date,Ship Date,Ship Mode,Customer ID,Customer Name,Segment,Country,City,State,Postal Code,Region,Product ID,Category,Sub-Category,Product Name,Sales";

const ROWS: [&str; 6] = [
    "1,CA-2017-152156,08/11/2017,11/11/2017,Second Class,CG-12520,Claire Gute,Consumer,United States,Henderson,Kentucky,42420,South,FUR-BO-10001798,Furniture,Bookcases,Bush Somerset Collection Bookcase,261.96",
    "2,CA-2017-152156,08/11/2017,11/11/2017,Second Class,CG-12520,Claire Gute,Consumer,United States,Henderson,Kentucky,42420,South,FUR-CH-10000454,Furniture,Chairs,\"Hon Deluxe Fabric Upholstered Stacking Chairs, Rounded Back\",731.94",
    "3,CA-2017-138688,12/06/2017,16/06/2017,Second Class,DV-13045,Darrin Van Huff,Corporate,United States,Los Angeles,California,90036,West,OFF-LA-10000240,Office Supplies,Labels,Self-Adhesive Address Labels for Typewriters by Universal,14.62",
    "4,US-2016-108966,11/10/2016,18/10/2016,Standard Class,SO-20335,Sean O'Donnell,Consumer,United States,Fort Lauderdale,Florida,33311,South,FUR-TA-10000577,Furniture,Tables,Bretford CR4500 Series Slim Rectangular Table,957.5775",
    "5,US-2016-108966,11/10/2016,18/10/2016,Standard Class,SO-20335,Sean O'Donnell,Consumer,United States,Fort Lauderdale,Florida,33311,South,OFF-ST-10000760,Office Supplies,Storage,Eldon Fold 'N Roll Cart System,22.368",
    "6,CA-2015-115812,09/06/2015,14/06/2015,Standard Class,BH-11710,Brosina Hoffman,Consumer,United States,Los Angeles,California,90032,West,TEC-PH-10002275,Technology,Phones,Mitel 5320 IP Phone VoIP phone,907.152",
];

fn write_csv(rows: &[&str]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_load_aggregate_format() {
    let file = write_csv(&ROWS);
    let table = load_path(file.path(), &LoadOptions::default()).unwrap();
    assert_eq!(table.len(), 6);
    assert_eq!(table.columns().len(), 18);

    let by_category = aggregate(&table, &[Field::Category], Metric::Sales);
    let ranked = rank(&by_category, RankBy::Sum);
    let lines = format_ranked(&ranked, by_category.total(), &FormatOptions::default());

    assert_eq!(
        lines,
        vec![
            "1. Furniture: $1,951.48 (67.4% of total sales)",
            "2. Technology: $907.15 (31.3% of total sales)",
            "3. Office Supplies: $36.99 (1.3% of total sales)",
        ]
    );
}

#[test]
fn test_long_product_names_truncate_in_display_only() {
    let file = write_csv(&ROWS);
    let table = load_path(file.path(), &LoadOptions::default()).unwrap();

    let products = aggregate(&table, &[Field::ProductName], Metric::Sales);
    let top = top_n(&products, 2, RankBy::Sum).unwrap();
    let lines = format_ranked(
        &top,
        products.total(),
        &FormatOptions {
            show_share: false,
            ..FormatOptions::default()
        },
    );

    assert_eq!(lines[0], "1. Bretford CR4500 Series Slim Rectangular Table: $957.58");
    assert_eq!(
        lines[1],
        "2. Mitel 5320 IP Phone VoIP phone: $907.15"
    );

    let chairs = "Hon Deluxe Fabric Upholstered Stacking Chairs, Rounded Back";
    assert!(products.get(&chairs.into()).is_some());
    let all = format_ranked(
        &rank(&products, RankBy::Sum),
        products.total(),
        &FormatOptions::default(),
    );
    assert!(all
        .iter()
        .any(|l| l.contains("Hon Deluxe Fabric Upholstered Stacking Chairs, Rou...")));
}

#[test]
fn test_key_insights_report_end_to_end() {
    let file = write_csv(&ROWS);
    let table = load_path(file.path(), &LoadOptions::default()).unwrap();
    let report = KeyInsightsReport::build(&table, &ReportOptions::default()).unwrap();
    let text = report.to_string();

    assert!(text.starts_with("=== KEY BUSINESS INSIGHTS FROM SALES DATA ANALYSIS ===\n"));
    assert!(text.contains("Total Sales Revenue: $2,895.62\n"));
    assert!(text.contains("2015 to 2016: +8.0%\n"));
    assert!(text.contains("1. REGIONAL EXPANSION: Focus on West region - significant growth potential\n"));

    let temporal = report
        .sections()
        .iter()
        .find(|s| s.title == "TEMPORAL PERFORMANCE INSIGHTS")
        .unwrap();
    assert_eq!(
        temporal.lines[..4].to_vec(),
        vec![
            "Year-over-Year Performance:",
            "2015: $907.15 (31.3% of total sales)",
            "2016: $979.95 (33.8% of total sales)",
            "2017: $1,008.52 (34.8% of total sales)",
        ]
    );
}

#[test]
fn test_overview_report_end_to_end() {
    let file = write_csv(&ROWS);
    let table = load_path(file.path(), &LoadOptions::default()).unwrap();
    let report = OverviewReport::build(&table, &ReportOptions::default()).unwrap();

    let lines = report.lines();
    assert!(lines.contains(&"Dataset Shape: (6, 18)".to_string()));
    assert!(lines.contains(&"Duplicate Row IDs: 0".to_string()));
}

#[test]
fn test_overview_reports_blank_postal_codes() {
    let no_postcode = ROWS[3].replace(",33311,", ",,");
    let file = write_csv(&[ROWS[0], ROWS[1], ROWS[2], &no_postcode, ROWS[4], ROWS[5]]);
    let table = load_path(file.path(), &LoadOptions::default()).unwrap();
    let report = OverviewReport::build(&table, &ReportOptions::default()).unwrap();

    let quality = report
        .sections()
        .iter()
        .find(|s| s.title == "DATA QUALITY ASSESSMENT")
        .unwrap();
    assert_eq!(
        quality.lines,
        vec!["Missing Values:", "Postal Code: 1", "", "Duplicate Row IDs: 0"]
    );

    let clean = write_csv(&ROWS);
    let table = load_path(clean.path(), &LoadOptions::default()).unwrap();
    let report = OverviewReport::build(&table, &ReportOptions::default()).unwrap();
    assert!(report.lines().contains(&"None".to_string()));
}

#[test]
fn test_bad_row_aborts_the_load() {
    let bad = ROWS[2].replace("12/06/2017", "2017-06-12");
    let file = write_csv(&[ROWS[0], ROWS[1], &bad]);

    match load_path(file.path(), &LoadOptions::default()) {
        Err(Error::Parse(e)) => {
            assert_eq!(e.row, 2);
            assert_eq!(e.column, "Order Date");
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}
