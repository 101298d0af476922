use crate::error::{Error, Result};

use std::collections::BTreeMap;

/// Percentage change between two consecutive years
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearOverYear {
    pub from_year: i32,
    pub to_year: i32,
    pub pct_change: f64,
}

/// `(curr - prev) / prev * 100`
pub fn pct_change(prev: f64, curr: f64) -> Result<f64> {
    if prev == 0.0 {
        return Err(Error::division("growth from a zero base"));
    }
    Ok((curr - prev) / prev * 100.0)
}

/// Growth between each pair of consecutive years present, ascending
///
/// Fails as a whole if any year in the chain has a zero total; callers that
/// want per-pair figures use [`pct_change`] directly.
pub fn year_over_year_growth(yearly_sums: &BTreeMap<i32, f64>) -> Result<Vec<YearOverYear>> {
    yearly_sums
        .iter()
        .zip(yearly_sums.iter().skip(1))
        .map(|((&from_year, &prev), (&to_year, &curr))| {
            let pct_change = pct_change(prev, curr).map_err(|_| {
                Error::division(format!("growth from {from_year} to {to_year}"))
            })?;
            Ok(YearOverYear {
                from_year,
                to_year,
                pct_change,
            })
        })
        .collect()
}
