//! Loading the source table into typed records
//!
//! The CSV is read by polars with every column kept as a string; each row is
//! then validated into a [`Record`]. Loading is all-or-nothing: the first bad
//! row aborts with a [`ParseError`] naming its zero-based index.

use crate::error::{Error, ParseError, ParseReason, Result};
use crate::record::{Record, Table, REQUIRED_COLUMNS};

use chrono::NaiveDate;
use log::{debug, info};
use polars::prelude::*;

use std::io::Cursor;
use std::path::Path;

/// Options controlling how the source table is read
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// Field separator character
    pub separator: u8,
    /// `chrono` format string for order and ship dates
    pub date_format: String,
    /// Refuse tables with more data rows than this
    pub max_rows: Option<usize>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            separator: b',',
            date_format: "%d/%m/%Y".to_string(),
            max_rows: None,
        }
    }
}

/// Read and validate the table stored at `path`
pub fn load_path(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Table> {
    let path = path.as_ref();
    info!("Loading sales records from {}", path.display());
    let bytes = std::fs::read(path)?;
    load_bytes(bytes, options)
}

/// Read and validate a table held in memory
pub fn load_bytes(bytes: impl Into<Vec<u8>>, options: &LoadOptions) -> Result<Table> {
    let separator = options.separator;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|parse| parse.with_separator(separator))
        .into_reader_with_file_handle(Cursor::new(bytes.into()))
        .finish()?;

    from_dataframe(&df, options)
}

/// Validate an all-string `DataFrame` into a [`Table`]
pub fn from_dataframe(df: &DataFrame, options: &LoadOptions) -> Result<Table> {
    let header: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    for required in REQUIRED_COLUMNS {
        if !header.iter().any(|name| name == required) {
            return Err(Error::MissingColumn(required.to_string()));
        }
    }

    if let Some(limit) = options.max_rows {
        if df.height() > limit {
            return Err(Error::RowLimit {
                rows: df.height(),
                limit,
            });
        }
    }

    let columns = SourceColumns::new(df)?;
    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        records.push(columns.record(row, options)?);
    }

    let missing: Vec<usize> = df.get_columns().iter().map(missing_count).collect();

    info!("Loaded {} records ({} columns)", records.len(), header.len());
    Ok(Table::new(records, header).with_missing(missing))
}

/// Rows with no value in `column`; an empty string counts as missing
fn missing_count(column: &Column) -> usize {
    match column.str() {
        Ok(values) => values
            .into_iter()
            .filter(|value| matches!(value, None | Some("")))
            .count(),
        Err(_) => column.null_count(),
    }
}

/// The required columns, resolved once
struct SourceColumns<'a> {
    row_id: &'a StringChunked,
    order_date: &'a StringChunked,
    ship_date: &'a StringChunked,
    sales: &'a StringChunked,
    category: &'a StringChunked,
    sub_category: &'a StringChunked,
    region: &'a StringChunked,
    state: &'a StringChunked,
    segment: &'a StringChunked,
    ship_mode: &'a StringChunked,
    customer_name: &'a StringChunked,
    product_name: &'a StringChunked,
}

fn string_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
    Ok(df.column(name)?.str()?)
}

impl<'a> SourceColumns<'a> {
    fn new(df: &'a DataFrame) -> Result<Self> {
        Ok(Self {
            row_id: string_column(df, "Row ID")?,
            order_date: string_column(df, "Order Date")?,
            ship_date: string_column(df, "Ship Date")?,
            sales: string_column(df, "Sales")?,
            category: string_column(df, "Category")?,
            sub_category: string_column(df, "Sub-Category")?,
            region: string_column(df, "Region")?,
            state: string_column(df, "State")?,
            segment: string_column(df, "Segment")?,
            ship_mode: string_column(df, "Ship Mode")?,
            customer_name: string_column(df, "Customer Name")?,
            product_name: string_column(df, "Product Name")?,
        })
    }

    fn record(&self, row: usize, options: &LoadOptions) -> Result<Record> {
        Ok(Record {
            row_id: text(self.row_id, row),
            order_date: parse_date(self.order_date, row, "Order Date", &options.date_format)?,
            ship_date: parse_date(self.ship_date, row, "Ship Date", &options.date_format)?,
            sales: parse_amount(self.sales, row, "Sales")?,
            category: text(self.category, row),
            sub_category: text(self.sub_category, row),
            region: text(self.region, row),
            state: text(self.state, row),
            segment: text(self.segment, row),
            ship_mode: text(self.ship_mode, row),
            customer_name: text(self.customer_name, row),
            product_name: text(self.product_name, row),
        })
    }
}

fn text(column: &StringChunked, row: usize) -> String {
    column.get(row).unwrap_or_default().to_string()
}

fn required<'a>(column: &'a StringChunked, row: usize, name: &'static str) -> Result<&'a str> {
    match column.get(row).map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => {
            debug!("Row {row} has no value for '{name}'");
            Err(ParseError::missing(row, name).into())
        }
    }
}

fn parse_date(
    column: &StringChunked,
    row: usize,
    name: &'static str,
    format: &str,
) -> Result<NaiveDate> {
    let value = required(column, row, name)?;
    NaiveDate::parse_from_str(value, format).map_err(|_| {
        ParseError {
            row,
            column: name,
            reason: ParseReason::InvalidDate(value.to_string()),
        }
        .into()
    })
}

fn parse_amount(column: &StringChunked, row: usize, name: &'static str) -> Result<f64> {
    let value = required(column, row, name)?;
    let amount = value
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| ParseError {
            row,
            column: name,
            reason: ParseReason::InvalidAmount(value.to_string()),
        })?;

    if amount < 0.0 {
        return Err(ParseError {
            row,
            column: name,
            reason: ParseReason::NegativeAmount(amount),
        }
        .into());
    }

    Ok(amount)
}
