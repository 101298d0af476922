//! Strategic recommendations selected from rankings
//!
//! Every recommendation is an argmax or argmin over a [`RankedList`]; the
//! only arithmetic is the gap between the strongest and weakest entries.

use crate::ops::{aggregate, rank, RankBy, RankedEntry, RankedList};
use crate::record::{Field, Metric, Table};

use super::{format_currency, month_label, truncate_label};

/// Strongest and weakest entries of one ranking
#[derive(Debug, Clone, PartialEq)]
pub struct Gap {
    pub strongest: RankedEntry,
    pub weakest: RankedEntry,
}

impl Gap {
    /// First and last entries of a descending ranking
    pub fn of(list: &RankedList) -> Option<Gap> {
        Some(Gap {
            strongest: list.best()?.clone(),
            weakest: list.worst()?.clone(),
        })
    }

    /// How far the weakest entry trails the strongest
    pub fn difference(&self) -> f64 {
        self.strongest.value - self.weakest.value
    }
}

/// The closing recommendations of the key insights report
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Recommendations {
    pub region: Option<Gap>,
    pub category: Option<Gap>,
    /// Peak month is `strongest`, trough month `weakest`
    pub season: Option<Gap>,
    /// Segment with the highest average order value
    pub segment: Option<RankedEntry>,
    /// Ship mode carrying the most orders
    pub shipping: Option<RankedEntry>,
}

impl Recommendations {
    /// Select recommendations from ready-made rankings
    ///
    /// `regions`, `categories` and `months` rank total sales,
    /// `segment_aov` ranks mean order value and `ship_mode_orders` ranks
    /// order counts.
    pub fn derive(
        regions: &RankedList,
        categories: &RankedList,
        months: &RankedList,
        segment_aov: &RankedList,
        ship_mode_orders: &RankedList,
    ) -> Self {
        Self {
            region: Gap::of(regions),
            category: Gap::of(categories),
            season: Gap::of(months),
            segment: segment_aov.best().cloned(),
            shipping: ship_mode_orders.best().cloned(),
        }
    }

    /// Rank `table` and select recommendations from it
    pub fn from_table(table: &Table) -> Self {
        let ranked = |field: Field, by: RankBy| rank(&aggregate(table, &[field], Metric::Sales), by);

        Self::derive(
            &ranked(Field::Region, RankBy::Sum),
            &ranked(Field::Category, RankBy::Sum),
            &ranked(Field::Month, RankBy::Sum),
            &ranked(Field::Segment, RankBy::Mean),
            &ranked(Field::ShipMode, RankBy::Count),
        )
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Numbered recommendation paragraphs separated by blank lines
    pub fn lines(&self, label_width: usize) -> Vec<String> {
        let label = |entry: &RankedEntry| truncate_label(&entry.key.label(), label_width).into_owned();
        let mut paragraphs: Vec<Vec<String>> = Vec::new();

        if let Some(gap) = &self.region {
            paragraphs.push(vec![
                format!(
                    "REGIONAL EXPANSION: Focus on {} region - significant growth potential",
                    label(&gap.weakest)
                ),
                format!("   Current performance: {}", format_currency(gap.weakest.value)),
                format!(
                    "   Gap to top region ({}): {}",
                    label(&gap.strongest),
                    format_currency(gap.difference())
                ),
            ]);
        }

        if let Some(gap) = &self.category {
            paragraphs.push(vec![
                format!(
                    "CATEGORY OPTIMIZATION: Improve {} category performance",
                    label(&gap.weakest)
                ),
                format!("   Current performance: {}", format_currency(gap.weakest.value)),
                format!(
                    "   Potential if matching {}: {}",
                    label(&gap.strongest),
                    format_currency(gap.difference())
                ),
            ]);
        }

        if let Some(gap) = &self.season {
            paragraphs.push(vec![
                format!(
                    "SEASONAL STRATEGY: Capitalize on {} peak, boost {} performance",
                    month_label(&gap.strongest.key),
                    month_label(&gap.weakest.key)
                ),
                format!("   Peak month sales: {}", format_currency(gap.strongest.value)),
                format!("   Lowest month sales: {}", format_currency(gap.weakest.value)),
            ]);
        }

        if let Some(segment) = &self.segment {
            paragraphs.push(vec![format!(
                "CUSTOMER RETENTION: Focus on {} segment - highest AOV ({})",
                label(segment),
                format_currency(segment.value)
            )]);
        }

        if let Some(mode) = &self.shipping {
            paragraphs.push(vec![format!(
                "SHIPPING OPTIMIZATION: {} dominates - consider premium service promotion",
                label(mode)
            )]);
        }

        let mut lines = Vec::new();
        for (i, paragraph) in paragraphs.into_iter().enumerate() {
            if i > 0 {
                lines.push(String::new());
            }
            for (j, line) in paragraph.into_iter().enumerate() {
                if j == 0 {
                    lines.push(format!("{}. {line}", i + 1));
                } else {
                    lines.push(line);
                }
            }
        }
        lines
    }
}
