use crate::record::{Field, KeyPart, Metric, Table};

use indexmap::IndexMap;

use std::collections::BTreeSet;

use super::{GroupBy, GroupSummary, RankBy};

/// Two-field aggregation laid out as rows x columns
///
/// Only combinations present in the table have a cell; [`Pivot::grid`]
/// decides whether gaps become zero.
#[derive(Debug, Clone)]
pub struct Pivot {
    row_field: Field,
    column_field: Field,
    rows: Vec<KeyPart>,
    columns: Vec<KeyPart>,
    cells: IndexMap<(KeyPart, KeyPart), GroupSummary>,
}

/// Group `table` by the pair (`row_field`, `column_field`)
///
/// Equivalent to a pivot table with `sum` as the cell function. Row and
/// column labels are sorted ascending.
pub fn pivot(table: &Table, row_field: Field, column_field: Field, metric: Metric) -> Pivot {
    let result = GroupBy::new()
        .by(row_field)
        .by(column_field)
        .metric(metric)
        .run(table);

    let mut rows = BTreeSet::new();
    let mut columns = BTreeSet::new();
    let mut cells = IndexMap::with_capacity(result.len());

    for (key, summary) in &result {
        if let [row, column] = key.parts() {
            rows.insert(row.clone());
            columns.insert(column.clone());
            cells.insert((row.clone(), column.clone()), summary.clone());
        }
    }

    Pivot {
        row_field,
        column_field,
        rows: rows.into_iter().collect(),
        columns: columns.into_iter().collect(),
        cells,
    }
}

impl Pivot {
    pub fn row_field(&self) -> Field {
        self.row_field
    }

    pub fn column_field(&self) -> Field {
        self.column_field
    }

    pub fn rows(&self) -> &[KeyPart] {
        &self.rows
    }

    pub fn columns(&self) -> &[KeyPart] {
        &self.columns
    }

    pub fn cell(&self, row: &KeyPart, column: &KeyPart) -> Option<&GroupSummary> {
        self.cells.get(&(row.clone(), column.clone()))
    }

    /// Number of populated cells
    pub fn populated(&self) -> usize {
        self.cells.len()
    }

    /// Cell values row by row; absent cells are `None` unless `zero_fill`
    pub fn grid(&self, by: RankBy, zero_fill: bool) -> Vec<Vec<Option<f64>>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|column| match self.cell(row, column) {
                        Some(summary) => Some(by.value(summary)),
                        None if zero_fill => Some(0.0),
                        None => None,
                    })
                    .collect()
            })
            .collect()
    }
}
