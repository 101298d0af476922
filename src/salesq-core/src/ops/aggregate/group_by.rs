use crate::record::{Field, GroupKey, KeyPart, Metric, Table};

use indexmap::IndexMap;
use log::debug;

use std::collections::{BTreeMap, HashSet};

use super::{AggregationResult, GroupSummary};

/// Builder for a group-by aggregation
///
/// # Examples
///
/// ```rust,ignore
/// use salesq_core::ops::aggregate::GroupBy;
/// use salesq_core::record::{Field, Metric};
///
/// let by_region = GroupBy::new()
///     .by(Field::Region)
///     .metric(Metric::Sales)
///     .distinct(Field::CustomerName)
///     .run(&table);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GroupBy {
    fields: Vec<Field>,
    metric: Metric,
    distinct: Option<Field>,
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: usize,
    seen: HashSet<KeyPart>,
}

impl GroupBy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a grouping field; keys become tuples when called repeatedly
    #[must_use]
    pub fn by(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn fields(mut self, fields: &[Field]) -> Self {
        self.fields.extend_from_slice(fields);
        self
    }

    #[must_use]
    pub fn metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Also count distinct values of `field` within each group
    #[must_use]
    pub fn distinct(mut self, field: Field) -> Self {
        self.distinct = Some(field);
        self
    }

    /// Group `table`; with no fields the whole table forms one group
    pub fn run(&self, table: &Table) -> AggregationResult {
        let mut groups: IndexMap<GroupKey, Accumulator> = IndexMap::new();

        for record in table {
            let acc = groups
                .entry(GroupKey::of(record, &self.fields))
                .or_default();
            acc.sum += self.metric.value(record);
            acc.count += 1;
            if let Some(field) = self.distinct {
                acc.seen.insert(field.key(record));
            }
        }

        debug!(
            "Grouped {} records by {:?} into {} groups",
            table.len(),
            self.fields,
            groups.len()
        );

        let distinct = self.distinct.is_some();
        let groups = groups
            .into_iter()
            .map(|(key, acc)| {
                #[allow(clippy::cast_precision_loss)]
                let mean = acc.sum / acc.count as f64;
                let summary = GroupSummary {
                    sum: acc.sum,
                    mean,
                    count: acc.count,
                    distinct: distinct.then_some(acc.seen.len()),
                };
                (key, summary)
            })
            .collect();

        AggregationResult::new(self.fields.clone(), self.metric, groups)
    }
}

/// Group `table` by `fields` and summarise `metric`
pub fn aggregate(table: &Table, fields: &[Field], metric: Metric) -> AggregationResult {
    GroupBy::new().fields(fields).metric(metric).run(table)
}

/// Raw metric values per group, in first-seen key order
pub fn collect_values(table: &Table, fields: &[Field], metric: Metric) -> IndexMap<GroupKey, Vec<f64>> {
    let mut groups: IndexMap<GroupKey, Vec<f64>> = IndexMap::new();
    for record in table {
        groups
            .entry(GroupKey::of(record, fields))
            .or_default()
            .push(metric.value(record));
    }
    groups
}

/// Total sales per order year, ascending
pub fn yearly_sums(table: &Table) -> BTreeMap<i32, f64> {
    aggregate(table, &[Field::Year], Metric::Sales)
        .iter()
        .filter_map(|(key, summary)| {
            let year = key.first()?.as_int()?;
            Some((i32::try_from(year).ok()?, summary.sum))
        })
        .collect()
}

/// Total sales per calendar month (1-12) across all years, ascending
pub fn monthly_sums(table: &Table) -> BTreeMap<u32, f64> {
    aggregate(table, &[Field::Month], Metric::Sales)
        .iter()
        .filter_map(|(key, summary)| {
            let month = key.first()?.as_int()?;
            Some((u32::try_from(month).ok()?, summary.sum))
        })
        .collect()
}
