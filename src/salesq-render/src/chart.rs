//! Chart descriptions independent of any output format
//!
//! A [`ChartSpec`] is built from what the aggregation engine produces, a
//! [`RankedList`], an [`AggregationResult`] or a [`Pivot`], plus a
//! [`ChartKind`]. Renderers only ever read specs.

use crate::{Error, Result};

use salesq_core::insight::month_name;
use salesq_core::ops::stats::{box_stats, histogram, Bin, BoxStats};
use salesq_core::ops::{AggregationResult, Pivot, RankBy, RankedList};
use salesq_core::{Field, GroupKey, KeyPart};
use serde::Serialize;

use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Bins used when a histogram is drawn without an explicit count
pub const DEFAULT_BINS: usize = 50;

/// The kinds of chart a renderer can draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Bar,
    Line,
    Scatter,
    Heatmap,
    Histogram,
    Box,
}

impl ChartKind {
    pub const ALL: [ChartKind; 7] = [
        ChartKind::Pie,
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Scatter,
        ChartKind::Heatmap,
        ChartKind::Histogram,
        ChartKind::Box,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ChartKind::Pie => "pie",
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Scatter => "scatter",
            ChartKind::Heatmap => "heatmap",
            ChartKind::Histogram => "histogram",
            ChartKind::Box => "box",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Direction bars grow in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

/// A labelled value
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub label: String,
    pub value: f64,
}

/// A labelled position
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub label: String,
    pub x: f64,
    pub y: f64,
}

/// One box of a box plot
#[derive(Debug, Clone, PartialEq)]
pub struct BoxGroup {
    pub label: String,
    pub stats: BoxStats,
}

/// The data behind a chart
#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    /// Pie slices, bars or line points in display order
    Categorical(Vec<Category>),
    Points(Vec<Point>),
    /// Rows x columns; `None` marks an absent combination
    Grid {
        rows: Vec<String>,
        columns: Vec<String>,
        cells: Vec<Vec<Option<f64>>>,
    },
    Distribution {
        bins: Vec<Bin>,
        mean: Option<f64>,
    },
    Groups(Vec<BoxGroup>),
}

impl Series {
    pub fn is_empty(&self) -> bool {
        match self {
            Series::Categorical(c) => c.is_empty(),
            Series::Points(p) => p.is_empty(),
            Series::Grid { rows, columns, .. } => rows.is_empty() || columns.is_empty(),
            Series::Distribution { bins, .. } => bins.is_empty(),
            Series::Groups(g) => g.is_empty(),
        }
    }
}

/// Everything a renderer needs to draw one chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub orientation: Orientation,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub series: Series,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, title: impl Into<String>, series: Series) -> Self {
        Self {
            kind,
            title: title.into(),
            orientation: Orientation::Vertical,
            x_label: None,
            y_label: None,
            series,
        }
    }

    /// Draw bars horizontally
    #[must_use]
    pub fn horizontal(mut self) -> Self {
        self.orientation = Orientation::Horizontal;
        self
    }

    #[must_use]
    pub fn axis_labels(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_label = Some(x.into());
        self.y_label = Some(y.into());
        self
    }

    /// Chart a ranking in rank order
    ///
    /// Scatter plots and heatmaps need more than one value per key and are
    /// rejected.
    pub fn from_ranked(kind: ChartKind, title: impl Into<String>, list: &RankedList) -> Result<Self> {
        let series = match kind {
            ChartKind::Pie | ChartKind::Bar | ChartKind::Line => Series::Categorical(
                list.iter()
                    .map(|entry| Category {
                        label: entry.key.label(),
                        value: entry.value,
                    })
                    .collect(),
            ),
            ChartKind::Histogram | ChartKind::Box => {
                let values: Vec<f64> = list.iter().map(|e| e.value).collect();
                distribution_series(kind, &values)
            }
            ChartKind::Scatter | ChartKind::Heatmap => {
                return Err(Error::Unsupported {
                    kind,
                    input: "a ranked list",
                })
            }
        };
        Ok(Self::new(kind, title, series))
    }

    /// Chart an aggregation in ascending key order
    ///
    /// Scatter plots put the group count on x and the sum on y. Heatmaps
    /// need a result grouped by exactly two fields.
    pub fn from_aggregation(
        kind: ChartKind,
        title: impl Into<String>,
        result: &AggregationResult,
        by: RankBy,
    ) -> Result<Self> {
        let fields = result.fields();
        let sorted = result.sorted_by_key();

        #[allow(clippy::cast_precision_loss)]
        let series = match kind {
            ChartKind::Pie | ChartKind::Bar | ChartKind::Line => Series::Categorical(
                sorted
                    .iter()
                    .map(|(key, summary)| Category {
                        label: key_label(fields, key),
                        value: by.value(summary),
                    })
                    .collect(),
            ),
            ChartKind::Scatter => Series::Points(
                sorted
                    .iter()
                    .map(|(key, summary)| Point {
                        label: key_label(fields, key),
                        x: summary.count as f64,
                        y: summary.sum,
                    })
                    .collect(),
            ),
            ChartKind::Heatmap => {
                let [row_field, column_field] = fields else {
                    return Err(Error::Unsupported {
                        kind,
                        input: "an aggregation that is not grouped by two fields",
                    });
                };
                grid_series(
                    *row_field,
                    *column_field,
                    sorted.iter().filter_map(|(key, summary)| match key.parts() {
                        [row, column] => Some((row, column, by.value(summary))),
                        _ => None,
                    }),
                )
            }
            ChartKind::Histogram | ChartKind::Box => {
                let values: Vec<f64> = sorted.iter().map(|(_, s)| by.value(s)).collect();
                distribution_series(kind, &values)
            }
        };
        Ok(Self::new(kind, title, series))
    }

    /// Heatmap of a pivot; absent cells stay absent
    pub fn from_pivot(title: impl Into<String>, pivot: &Pivot, by: RankBy) -> Self {
        let grid = pivot.grid(by, false);
        let series = Series::Grid {
            rows: labels(pivot.row_field(), pivot.rows()),
            columns: labels(pivot.column_field(), pivot.columns()),
            cells: grid,
        };
        Self::new(ChartKind::Heatmap, title, series)
    }

    /// Equal-width histogram of raw values with the mean marked
    #[allow(clippy::cast_precision_loss)]
    pub fn histogram(title: impl Into<String>, values: &[f64], bins: usize) -> Self {
        let mean = (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64);
        let series = Series::Distribution {
            bins: histogram(values, bins),
            mean,
        };
        Self::new(ChartKind::Histogram, title, series)
    }

    /// One box per labelled group of raw values; empty groups are skipped
    pub fn box_plot(
        title: impl Into<String>,
        groups: impl IntoIterator<Item = (String, Vec<f64>)>,
    ) -> Self {
        let groups = groups
            .into_iter()
            .filter_map(|(label, values)| {
                Some(BoxGroup {
                    label,
                    stats: box_stats(&values)?,
                })
            })
            .collect();
        Self::new(ChartKind::Box, title, Series::Groups(groups))
    }
}

fn distribution_series(kind: ChartKind, values: &[f64]) -> Series {
    if kind == ChartKind::Box {
        let groups = box_stats(values)
            .map(|stats| BoxGroup {
                label: "All".to_string(),
                stats,
            })
            .into_iter()
            .collect();
        Series::Groups(groups)
    } else {
        ChartSpec::histogram("", values, DEFAULT_BINS).series
    }
}

fn grid_series<'a>(
    row_field: Field,
    column_field: Field,
    cells: impl Iterator<Item = (&'a KeyPart, &'a KeyPart, f64)>,
) -> Series {
    let mut rows = BTreeSet::new();
    let mut columns = BTreeSet::new();
    let mut values = HashMap::new();
    for (row, column, value) in cells {
        rows.insert(row);
        columns.insert(column);
        values.insert((row, column), value);
    }

    let grid = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| values.get(&(*row, *column)).copied())
                .collect()
        })
        .collect();

    Series::Grid {
        rows: rows.iter().map(|p| part_label(Some(row_field), p)).collect(),
        columns: columns
            .iter()
            .map(|p| part_label(Some(column_field), p))
            .collect(),
        cells: grid,
    }
}

fn labels(field: Field, parts: &[KeyPart]) -> Vec<String> {
    parts.iter().map(|p| part_label(Some(field), p)).collect()
}

fn part_label(field: Option<Field>, part: &KeyPart) -> String {
    match (field, part) {
        (Some(Field::Month), KeyPart::Int(m)) => u32::try_from(*m)
            .ok()
            .and_then(month_name)
            .map_or_else(|| part.to_string(), str::to_string),
        (Some(Field::Quarter), KeyPart::Int(q)) => format!("Q{q}"),
        _ => part.to_string(),
    }
}

/// Axis label for a grouping key, e.g. `Nov` or `2016-Q3`
pub fn key_label(fields: &[Field], key: &GroupKey) -> String {
    if key.parts().is_empty() {
        return "All".to_string();
    }
    key.parts()
        .iter()
        .enumerate()
        .map(|(i, part)| part_label(fields.get(i).copied(), part))
        .collect::<Vec<_>>()
        .join("-")
}
