//! Narrative formatting of aggregation results
//!
//! Everything here turns numbers into display strings: currency with
//! thousands separators, one-decimal percentages, truncated labels and the
//! numbered ranking lines used throughout the reports. Any figure that
//! cannot be computed renders as [`NOT_AVAILABLE`].

use crate::error::{Error, Result};
use crate::ops::{share, RankedList};
use crate::record::{GroupKey, KeyPart};

use num_format::{Locale, ToFormattedString};

use std::borrow::Cow;

mod recommend;

pub use recommend::{Gap, Recommendations};

/// Placeholder for a figure that could not be computed
pub const NOT_AVAILABLE: &str = "N/A";

/// Display width after which labels are truncated
pub const DEFAULT_LABEL_WIDTH: usize = 50;

const ELLIPSIS: &str = "...";

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Options for [`format_ranked`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Labels longer than this many characters are truncated
    pub label_width: usize,
    /// Append "(x% of total sales)" to each line
    pub show_share: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            label_width: DEFAULT_LABEL_WIDTH,
            show_share: true,
        }
    }
}

/// Format `value` as dollars with thousands separators and two decimals
///
/// # Examples
///
/// ```rust
/// use salesq_core::insight::format_currency;
///
/// assert_eq!(format_currency(1234.5), "$1,234.50");
/// assert_eq!(format_currency(-20.0), "$-20.00");
/// ```
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }

    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "${sign}{}.{:02}",
        (cents / 100).to_formatted_string(&Locale::en),
        cents % 100
    )
}

/// Format a count with thousands separators
pub fn format_count(count: usize) -> String {
    count.to_formatted_string(&Locale::en)
}

/// Percentage with one decimal, e.g. `36.4%`
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

/// Signed percentage with one decimal, e.g. `+12.3%` or `-4.0%`
pub fn format_signed_percent(value: f64) -> String {
    format!("{value:+.1}%")
}

/// Render a fallible figure, substituting [`NOT_AVAILABLE`] on division errors
///
/// Any other error is passed through.
pub fn or_not_available(figure: Result<f64>, render: impl Fn(f64) -> String) -> Result<String> {
    match figure {
        Ok(value) => Ok(render(value)),
        Err(e) if e.is_division() => Ok(NOT_AVAILABLE.to_string()),
        Err(e) => Err(e),
    }
}

/// Cut `label` to `width` characters followed by `...` when it is longer
pub fn truncate_label(label: &str, width: usize) -> Cow<'_, str> {
    match label.char_indices().nth(width) {
        Some((end, _)) => Cow::Owned(format!("{}{ELLIPSIS}", &label[..end])),
        None => Cow::Borrowed(label),
    }
}

/// Parse a string produced by [`format_currency`] back into a number
pub fn parse_currency(text: &str) -> Result<f64> {
    let digits = text
        .trim()
        .strip_prefix('$')
        .ok_or_else(|| Error::invalid_argument(format!("currency '{text}' has no '$' prefix")))?
        .replace(',', "");

    digits
        .parse::<f64>()
        .map_err(|_| Error::invalid_argument(format!("invalid currency '{text}'")))
}

/// Three-letter English name of `month` (1-12)
pub fn month_name(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month.checked_sub(1)?).ok()?;
    MONTH_NAMES.get(index).copied()
}

/// Display label for a key, naming months when the key is a month number
pub fn month_label(key: &GroupKey) -> String {
    key.first()
        .and_then(KeyPart::as_int)
        .and_then(|m| u32::try_from(m).ok())
        .and_then(month_name)
        .map_or_else(|| key.label(), str::to_string)
}

/// Numbered ranking lines: `1. Label: $1,234.56 (12.3% of total sales)`
///
/// Ranks are 1-based. With `show_share`, a zero `total` renders the share
/// as `N/A` instead of failing the whole listing.
pub fn format_ranked(list: &RankedList, total: f64, options: &FormatOptions) -> Vec<String> {
    list.iter()
        .enumerate()
        .map(|(i, entry)| {
            let label = entry.key.label();
            let mut line = format!(
                "{}. {}: {}",
                i + 1,
                truncate_label(&label, options.label_width),
                format_currency(entry.value)
            );
            if options.show_share {
                let pct = share(entry.value, total)
                    .map_or_else(|_| NOT_AVAILABLE.to_string(), format_percent);
                line.push_str(&format!(" ({pct} of total sales)"));
            }
            line
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{aggregate, rank, RankBy};
    use crate::record::{Field, Metric};
    use crate::test_support::{sale, table};

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(2_297_200.860_3), "$2,297,200.86");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_currency(-1234.5), "$-1,234.50");
        assert_eq!(format_currency(-0.001), "$0.00");
        assert_eq!(format_currency(f64::NAN), "N/A");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(36.428_57), "36.4%");
        assert_eq!(format_percent(100.0), "100.0%");
        assert_eq!(format_signed_percent(50.0), "+50.0%");
        assert_eq!(format_signed_percent(-2.83), "-2.8%");
        assert_eq!(format_count(9800), "9,800");
    }

    #[test]
    fn test_truncate_label() {
        let long = "Cisco TelePresence System EX90 Videoconferencing Unit";
        let cut = truncate_label(long, 50);
        assert_eq!(cut.chars().count(), 53);
        assert!(cut.ends_with("..."));
        assert!(cut.starts_with("Cisco TelePresence System EX90 Videoconferencing U"));

        let exact = "x".repeat(50);
        assert_eq!(truncate_label(&exact, 50), exact.as_str());

        // Character based, not byte based
        assert_eq!(truncate_label("Café Crème", 4), "Café...");
    }

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency("$1,234.56").unwrap(), 1234.56);
        assert_eq!(parse_currency("$-20.00").unwrap(), -20.0);
        assert!(parse_currency("1,234.56").is_err());
        assert!(parse_currency("$abc").is_err());
    }

    #[test]
    fn test_month_names() {
        assert_eq!(month_name(1), Some("Jan"));
        assert_eq!(month_name(12), Some("Dec"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
        assert_eq!(month_label(&GroupKey::int(11)), "Nov");
        assert_eq!(month_label(&GroupKey::text("West")), "West");
    }

    #[test]
    fn test_format_ranked() {
        let t = table(vec![
            sale("Furniture", 100.0),
            sale("Furniture", 50.0),
            sale("Tech", 200.0),
        ]);
        let result = aggregate(&t, &[Field::Category], Metric::Sales);
        let ranked = rank(&result, RankBy::Sum);

        let lines = format_ranked(&ranked, result.total(), &FormatOptions::default());
        assert_eq!(
            lines,
            vec![
                "1. Tech: $200.00 (57.1% of total sales)",
                "2. Furniture: $150.00 (42.9% of total sales)",
            ]
        );

        let bare = FormatOptions {
            show_share: false,
            ..FormatOptions::default()
        };
        assert_eq!(format_ranked(&ranked, 0.0, &bare)[0], "1. Tech: $200.00");
        assert_eq!(
            format_ranked(&ranked, 0.0, &FormatOptions::default())[1],
            "2. Furniture: $150.00 (N/A of total sales)"
        );
    }

    #[test]
    fn test_or_not_available() {
        assert_eq!(
            or_not_available(Err(Error::division("x")), format_percent).unwrap(),
            "N/A"
        );
        assert_eq!(or_not_available(Ok(12.34), format_percent).unwrap(), "12.3%");
        assert!(or_not_available(Err(Error::KeyNotFound("x".into())), format_percent).is_err());
    }
}
