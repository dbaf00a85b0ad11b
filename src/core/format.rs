//! Money, date and chart formatting for dashboard views

use crate::core::model::Revenue;
use chrono::NaiveDate;

/// Convert a major-unit amount to integer minor units (cents)
///
/// This is the only place the ×100 conversion happens. Returns `None` for
/// non-finite input and for values outside the `i64` range.
pub fn to_minor_units(major: f64) -> Option<i64> {
    let cents = (major * 100.0).round();
    // i64::MAX is not representable as f64; 2^63 is the first value past it
    if cents.is_finite() && cents >= i64::MIN as f64 && cents < i64::MAX as f64 {
        Some(cents as i64)
    } else {
        None
    }
}

/// Format minor units as US dollars, e.g. `123456` -> `$1,234.56`
pub fn format_currency(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let dollars = (abs / 100).to_string();
    let remainder = abs % 100;

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}.{:02}", sign, grouped, remainder)
}

/// Format a date the way the dashboard tables show it, e.g. `Dec 6, 2022`
pub fn format_date_to_local(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Y-axis labels for the revenue chart
///
/// Returns the labels from the top down (`$5k` … `$0k`) and the top value,
/// which is the highest monthly revenue rounded up to the next thousand.
pub fn generate_y_axis(revenue: &[Revenue]) -> (Vec<String>, i64) {
    let highest = revenue.iter().map(|r| r.revenue).max().unwrap_or(0).max(0);
    let top_label = ((highest + 999) / 1000) * 1000;

    let labels = (0..=top_label / 1000)
        .rev()
        .map(|k| format!("${}k", k))
        .collect();

    (labels, top_label)
}
