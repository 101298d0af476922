//! Chart export
//!
//! Two fixed grids of charts, each composed into a single SVG document:
//! a 4x3 overview of the whole dataset and a 2x2 detail sheet.

use crate::chart::{ChartKind, ChartSpec};
use crate::svg::{escape, Renderable, Renderer, SvgRenderer};
use crate::Result;

use log::{debug, info};
use salesq_core::ops::{aggregate, collect_values, pivot, rank, top_n, RankBy};
use salesq_core::{Field, Metric, Table};
use serde::Serialize;

use std::fs;
use std::path::{Path, PathBuf};

/// File name of the overview grid
pub const OVERVIEW_FILE: &str = "sales_analysis_dashboard.svg";
/// File name of the detail grid
pub const DETAIL_FILE: &str = "detailed_sales_analysis.svg";

const TITLE_HEIGHT: f64 = 48.0;
const OVERVIEW_TOP: usize = 10;
const DETAIL_TOP_PRODUCTS: usize = 15;

/// Where and how big the exported charts are
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub out_dir: PathBuf,
    pub histogram_bins: usize,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            histogram_bins: 50,
            chart_width: 480,
            chart_height: 360,
        }
    }
}

/// Rendered charts laid out row by row in a fixed number of columns
#[derive(Debug, Clone, PartialEq)]
pub struct ChartGrid {
    title: String,
    columns: usize,
    cell_width: u32,
    cell_height: u32,
    cells: Vec<Renderable>,
}

impl ChartGrid {
    pub fn new(title: impl Into<String>, columns: usize, cell_width: u32, cell_height: u32) -> Self {
        Self {
            title: title.into(),
            columns: columns.max(1),
            cell_width,
            cell_height,
            cells: Vec::new(),
        }
    }

    pub fn push(&mut self, chart: Renderable) {
        self.cells.push(chart);
    }

    pub fn cells(&self) -> &[Renderable] {
        &self.cells
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.cells.len().div_ceil(self.columns)
    }

    /// The whole grid as a standalone SVG document
    pub fn to_svg(&self) -> String {
        let cell_width = f64::from(self.cell_width);
        let cell_height = f64::from(self.cell_height);
        let width = cell_width * self.columns as f64;
        let height = TITLE_HEIGHT + cell_height * self.rows() as f64;

        let mut svg = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" height=\"{height:.0}\" viewBox=\"0 0 {width:.0} {height:.0}\" font-family=\"sans-serif\">\n"
        ));
        svg.push_str(&format!(
            "<rect width=\"{width:.0}\" height=\"{height:.0}\" fill=\"#FFFFFF\"/>\n"
        ));
        svg.push_str(&format!(
            "<text x=\"{:.0}\" y=\"30\" text-anchor=\"middle\" font-size=\"20\" font-weight=\"bold\">{}</text>\n",
            width / 2.0,
            escape(&self.title)
        ));

        for (i, chart) in self.cells.iter().enumerate() {
            let x = cell_width * (i % self.columns) as f64;
            let y = TITLE_HEIGHT + cell_height * (i / self.columns) as f64;
            svg.push_str(&format!(
                "<g transform=\"translate({x:.0},{y:.0})\">\n{}\n</g>\n",
                chart.markup
            ));
        }

        svg.push_str("</svg>\n");
        svg
    }
}

/// The twelve-chart overview of the whole dataset, three per row
pub fn overview_grid(
    table: &Table,
    options: &ExportOptions,
    renderer: &dyn Renderer,
) -> Result<ChartGrid> {
    let by = |field: Field| aggregate(table, &[field], Metric::Sales);
    let sales: Vec<f64> = table.iter().map(|r| r.sales).collect();

    let specs = vec![
        ChartSpec::from_ranked(
            ChartKind::Bar,
            "Total Sales by Category",
            &rank(&by(Field::Category), RankBy::Sum),
        )?
        .horizontal()
        .axis_labels("Sales ($)", "Category"),
        ChartSpec::from_ranked(
            ChartKind::Pie,
            "Sales Distribution by Region",
            &rank(&by(Field::Region), RankBy::Sum),
        )?,
        ChartSpec::from_ranked(
            ChartKind::Bar,
            "Sales by Customer Segment",
            &rank(&by(Field::Segment), RankBy::Sum),
        )?
        .horizontal()
        .axis_labels("Sales ($)", "Segment"),
        ChartSpec::from_aggregation(
            ChartKind::Line,
            "Monthly Sales Trend",
            &by(Field::Month),
            RankBy::Sum,
        )?
        .axis_labels("Month", "Sales ($)"),
        ChartSpec::from_aggregation(
            ChartKind::Bar,
            "Yearly Sales Performance",
            &by(Field::Year),
            RankBy::Sum,
        )?
        .axis_labels("Year", "Sales ($)"),
        ChartSpec::from_ranked(
            ChartKind::Bar,
            format!("Top {OVERVIEW_TOP} Sub-Categories by Sales"),
            &top_n(&by(Field::SubCategory), OVERVIEW_TOP, RankBy::Sum)?,
        )?
        .axis_labels("Sub-Category", "Sales ($)"),
        ChartSpec::histogram("Sales Distribution", &sales, options.histogram_bins)
            .axis_labels("Sales Amount ($)", "Frequency"),
        ChartSpec::from_ranked(
            ChartKind::Bar,
            "Sales by Shipping Mode",
            &rank(&by(Field::ShipMode), RankBy::Sum),
        )?
        .horizontal()
        .axis_labels("Sales ($)", "Shipping Mode"),
        ChartSpec::from_ranked(
            ChartKind::Bar,
            format!("Top {OVERVIEW_TOP} States by Sales"),
            &top_n(&by(Field::State), OVERVIEW_TOP, RankBy::Sum)?,
        )?
        .axis_labels("State", "Sales ($)"),
        ChartSpec::from_aggregation(
            ChartKind::Scatter,
            "Sales vs Orders by Category",
            &by(Field::Category),
            RankBy::Sum,
        )?
        .axis_labels("Number of Orders", "Total Sales ($)"),
        ChartSpec::from_aggregation(
            ChartKind::Line,
            "Quarterly Sales Trend",
            &aggregate(table, &[Field::Year, Field::Quarter], Metric::Sales),
            RankBy::Sum,
        )?
        .axis_labels("Quarter", "Sales ($)"),
        ChartSpec::from_ranked(
            ChartKind::Bar,
            "Average Order Value by Segment",
            &rank(&by(Field::Segment), RankBy::Mean),
        )?
        .horizontal()
        .axis_labels("Average Order Value ($)", "Segment"),
    ];

    compose("Sales Analysis Dashboard", 3, &specs, options, renderer)
}

/// Region x category heatmap, sales by category, daily trend and top products
pub fn detail_grid(
    table: &Table,
    options: &ExportOptions,
    renderer: &dyn Renderer,
) -> Result<ChartGrid> {
    let by_category = collect_values(table, &[Field::Category], Metric::Sales)
        .into_iter()
        .map(|(key, values)| (key.label(), values));
    let products = aggregate(table, &[Field::ProductName], Metric::Sales);

    let specs = vec![
        ChartSpec::from_pivot(
            "Sales Heatmap: Region vs Category",
            &pivot(table, Field::Region, Field::Category, Metric::Sales),
            RankBy::Sum,
        ),
        ChartSpec::box_plot("Sales Distribution by Category", by_category)
            .axis_labels("Category", "Sales ($)"),
        ChartSpec::from_aggregation(
            ChartKind::Line,
            "Daily Sales Trend",
            &aggregate(table, &[Field::OrderDate], Metric::Sales),
            RankBy::Sum,
        )?
        .axis_labels("Date", "Sales ($)"),
        ChartSpec::from_ranked(
            ChartKind::Bar,
            format!("Top {DETAIL_TOP_PRODUCTS} Products by Sales"),
            &top_n(&products, DETAIL_TOP_PRODUCTS, RankBy::Sum)?,
        )?
        .horizontal()
        .axis_labels("Sales ($)", "Product"),
    ];

    compose("Detailed Sales Analysis", 2, &specs, options, renderer)
}

fn compose(
    title: &str,
    columns: usize,
    specs: &[ChartSpec],
    options: &ExportOptions,
    renderer: &dyn Renderer,
) -> Result<ChartGrid> {
    let mut grid = ChartGrid::new(title, columns, options.chart_width, options.chart_height);
    for spec in specs {
        grid.push(renderer.render(spec)?);
    }
    debug!("Composed '{}' from {} charts", title, grid.cells().len());
    Ok(grid)
}

/// Paths of the written artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedFiles {
    pub overview: PathBuf,
    pub detail: PathBuf,
}

/// Render both grids and write them into `options.out_dir`
pub fn write_artifacts(table: &Table, options: &ExportOptions) -> Result<ExportedFiles> {
    let renderer = SvgRenderer::new(options.chart_width, options.chart_height);
    fs::create_dir_all(&options.out_dir)?;

    let overview = write_grid(
        &overview_grid(table, options, &renderer)?,
        &options.out_dir.join(OVERVIEW_FILE),
    )?;
    let detail = write_grid(
        &detail_grid(table, options, &renderer)?,
        &options.out_dir.join(DETAIL_FILE),
    )?;

    Ok(ExportedFiles { overview, detail })
}

fn write_grid(grid: &ChartGrid, path: &Path) -> Result<PathBuf> {
    fs::write(path, grid.to_svg())?;
    info!(
        "Saved {} charts to {}",
        grid.cells().len(),
        path.display()
    );
    Ok(path.to_path_buf())
}
