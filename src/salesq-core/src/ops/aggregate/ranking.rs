use crate::error::{Error, Result};
use crate::record::GroupKey;

use super::{AggregationResult, RankBy};

/// One ranked group
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub key: GroupKey,
    pub value: f64,
}

/// Groups ordered by value, largest first
///
/// Equal values keep the order in which their keys were first seen.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RankedList {
    entries: Vec<RankedEntry>,
}

impl RankedList {
    pub fn entries(&self) -> &[RankedEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest-ranked entry
    pub fn best(&self) -> Option<&RankedEntry> {
        self.entries.first()
    }

    /// Lowest-ranked entry: the last one of the descending order
    pub fn worst(&self) -> Option<&RankedEntry> {
        self.entries.last()
    }

    /// Smallest value, earliest-seen among equal minima
    pub fn argmin(&self) -> Option<&RankedEntry> {
        self.entries.iter().fold(None, |min: Option<&RankedEntry>, entry| match min {
            Some(current) if current.value <= entry.value => Some(current),
            _ => Some(entry),
        })
    }

    /// The first `n` entries
    #[must_use]
    pub fn head(&self, n: usize) -> RankedList {
        RankedList {
            entries: self.entries.iter().take(n).cloned().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RankedList {
    type Item = &'a RankedEntry;
    type IntoIter = std::slice::Iter<'a, RankedEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Rank every group of `result` by `by`, descending
pub fn rank(result: &AggregationResult, by: RankBy) -> RankedList {
    let mut entries: Vec<RankedEntry> = result
        .iter()
        .map(|(key, summary)| RankedEntry {
            key: key.clone(),
            value: by.value(summary),
        })
        .collect();

    // Stable sort, so ties stay in first-seen order
    entries.sort_by(|a, b| b.value.total_cmp(&a.value));

    RankedList { entries }
}

/// The `n` groups with the largest `by` value
///
/// Returns every group when fewer than `n` exist. `n` must be at least one.
pub fn top_n(result: &AggregationResult, n: usize, by: RankBy) -> Result<RankedList> {
    if n == 0 {
        return Err(Error::invalid_argument("top-N requires n >= 1"));
    }

    Ok(rank(result, by).head(n))
}

/// Share of the total sum held by `key`, in percent
pub fn percent_of_total(result: &AggregationResult, key: &GroupKey) -> Result<f64> {
    let total = result.total();
    if total == 0.0 {
        return Err(Error::division(format!("share of total for '{key}'")));
    }

    let summary = result
        .get(key)
        .ok_or_else(|| Error::KeyNotFound(key.label()))?;

    share(summary.sum, total)
}

/// `value` as a percentage of `total`
pub fn share(value: f64, total: f64) -> Result<f64> {
    if total == 0.0 {
        return Err(Error::division("share of total"));
    }
    Ok(value / total * 100.0)
}
