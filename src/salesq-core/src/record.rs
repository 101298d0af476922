//! Typed sales records and the keys used to group them
//!
//! Every source row becomes a [`Record`] with named, typed fields. Grouping
//! works on [`Field`]s, which extract a [`KeyPart`] from a record; several
//! parts form a [`GroupKey`].

use crate::error::{Error, Result};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use smallvec::SmallVec;

use std::fmt;
use std::str::FromStr;

/// One sale transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub row_id: String,
    pub order_date: NaiveDate,
    pub ship_date: NaiveDate,
    pub sales: f64,
    pub category: String,
    pub sub_category: String,
    pub region: String,
    pub state: String,
    pub segment: String,
    pub ship_mode: String,
    pub customer_name: String,
    pub product_name: String,
}

impl Record {
    /// Calendar year of the order date
    pub fn year(&self) -> i32 {
        self.order_date.year()
    }

    /// Month of the order date, 1-12
    pub fn month(&self) -> u32 {
        self.order_date.month()
    }

    /// Quarter of the order date, 1-4
    pub fn quarter(&self) -> u32 {
        (self.order_date.month() - 1) / 3 + 1
    }

    /// Days between ordering and shipping
    pub fn ship_days(&self) -> i64 {
        (self.ship_date - self.order_date).num_days()
    }

    /// The free-text field stored for source column `column`, if any
    pub fn text(&self, column: &str) -> Option<&str> {
        let value = match column {
            "Row ID" => &self.row_id,
            "Category" => &self.category,
            "Sub-Category" => &self.sub_category,
            "Region" => &self.region,
            "State" => &self.state,
            "Segment" => &self.segment,
            "Ship Mode" => &self.ship_mode,
            "Customer Name" => &self.customer_name,
            "Product Name" => &self.product_name,
            _ => return None,
        };
        Some(value)
    }
}

/// An in-memory table of records plus the header it was loaded from
///
/// Alongside each header column the table keeps how many source rows had no
/// value in it, including columns that never reach a [`Record`].
#[derive(Debug, Clone, Default)]
pub struct Table {
    records: Vec<Record>,
    columns: Vec<String>,
    missing: Vec<usize>,
}

impl Table {
    /// Missing counts are taken from the records' text fields; columns not
    /// stored on [`Record`] count zero until [`Table::with_missing`] says otherwise
    pub fn new(records: Vec<Record>, columns: Vec<String>) -> Self {
        let missing = columns
            .iter()
            .map(|column| {
                records
                    .iter()
                    .filter(|r| r.text(column).is_some_and(str::is_empty))
                    .count()
            })
            .collect();

        Self {
            records,
            columns,
            missing,
        }
    }

    /// Build a table from records alone, with the required header
    pub fn from_records(records: Vec<Record>) -> Self {
        let columns = REQUIRED_COLUMNS.iter().map(|c| (*c).to_string()).collect();
        Self::new(records, columns)
    }

    /// Replace the per-column missing counts, one per header column
    pub fn with_missing(mut self, missing: Vec<usize>) -> Self {
        debug_assert_eq!(missing.len(), self.columns.len());
        self.missing = missing;
        self
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Column names of the source header, in source order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Each header column with the number of rows missing a value in it
    pub fn missing_values(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.missing.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Columns the source header must contain
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "Row ID",
    "Order Date",
    "Ship Date",
    "Sales",
    "Category",
    "Sub-Category",
    "Region",
    "State",
    "Segment",
    "Ship Mode",
    "Customer Name",
    "Product Name",
];

/// A record field that can serve as a grouping key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    OrderDate,
    ShipDate,
    Year,
    Month,
    Quarter,
    Category,
    SubCategory,
    Region,
    State,
    Segment,
    ShipMode,
    CustomerName,
    ProductName,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::OrderDate,
        Field::ShipDate,
        Field::Year,
        Field::Month,
        Field::Quarter,
        Field::Category,
        Field::SubCategory,
        Field::Region,
        Field::State,
        Field::Segment,
        Field::ShipMode,
        Field::CustomerName,
        Field::ProductName,
    ];

    /// Column name as it appears in the source header (or the derived name)
    pub fn column_name(self) -> &'static str {
        match self {
            Field::OrderDate => "Order Date",
            Field::ShipDate => "Ship Date",
            Field::Year => "Year",
            Field::Month => "Month",
            Field::Quarter => "Quarter",
            Field::Category => "Category",
            Field::SubCategory => "Sub-Category",
            Field::Region => "Region",
            Field::State => "State",
            Field::Segment => "Segment",
            Field::ShipMode => "Ship Mode",
            Field::CustomerName => "Customer Name",
            Field::ProductName => "Product Name",
        }
    }

    /// Extract this field's key from a record
    pub fn key(self, record: &Record) -> KeyPart {
        match self {
            Field::OrderDate => KeyPart::Date(record.order_date),
            Field::ShipDate => KeyPart::Date(record.ship_date),
            Field::Year => KeyPart::Int(i64::from(record.year())),
            Field::Month => KeyPart::Int(i64::from(record.month())),
            Field::Quarter => KeyPart::Int(i64::from(record.quarter())),
            Field::Category => KeyPart::Text(record.category.clone()),
            Field::SubCategory => KeyPart::Text(record.sub_category.clone()),
            Field::Region => KeyPart::Text(record.region.clone()),
            Field::State => KeyPart::Text(record.state.clone()),
            Field::Segment => KeyPart::Text(record.segment.clone()),
            Field::ShipMode => KeyPart::Text(record.ship_mode.clone()),
            Field::CustomerName => KeyPart::Text(record.customer_name.clone()),
            Field::ProductName => KeyPart::Text(record.product_name.clone()),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for Field {
    type Err = Error;

    /// Accepts the source column name, case-insensitively, with `-`, `_`
    /// and spaces treated alike ("Ship Mode", "ship_mode", "sub-category").
    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize_name(s);
        Field::ALL
            .into_iter()
            .find(|field| normalize_name(field.column_name()) == wanted)
            .ok_or_else(|| Error::invalid_argument(format!("unknown field '{s}'")))
    }
}

fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// The numeric value aggregated per group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    /// Sales amount
    #[default]
    Sales,
    /// Order-to-ship lead time in days
    ShipDays,
}

impl Metric {
    pub fn value(self, record: &Record) -> f64 {
        match self {
            Metric::Sales => record.sales,
            #[allow(clippy::cast_precision_loss)]
            Metric::ShipDays => record.ship_days() as f64,
        }
    }
}

/// One component of a grouping key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    Int(i64),
    Date(NaiveDate),
    Text(String),
}

impl KeyPart {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            KeyPart::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            KeyPart::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Int(i) => write!(f, "{i}"),
            KeyPart::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            KeyPart::Text(s) => f.write_str(s),
        }
    }
}

/// A grouping key: one part per grouped field
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GroupKey(SmallVec<[KeyPart; 2]>);

impl GroupKey {
    /// Key of the single group formed when grouping by no fields
    pub fn empty() -> Self {
        GroupKey(SmallVec::new())
    }

    pub fn text(value: impl Into<String>) -> Self {
        GroupKey(smallvec::smallvec![KeyPart::Text(value.into())])
    }

    pub fn int(value: i64) -> Self {
        GroupKey(smallvec::smallvec![KeyPart::Int(value)])
    }

    pub fn from_parts(parts: impl IntoIterator<Item = KeyPart>) -> Self {
        GroupKey(parts.into_iter().collect())
    }

    pub(crate) fn of(record: &Record, fields: &[Field]) -> Self {
        GroupKey(fields.iter().map(|f| f.key(record)).collect())
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    pub fn first(&self) -> Option<&KeyPart> {
        self.0.first()
    }

    /// The key as display text
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

impl From<&str> for GroupKey {
    fn from(value: &str) -> Self {
        GroupKey::text(value)
    }
}
