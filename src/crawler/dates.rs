//! Target month resolution
//!
//! Statements are month-granular: whatever day is requested, the server is
//! asked for the last calendar day of that month.

use crate::crawler::SelectionOption;
use chrono::{Datelike, Months, NaiveDate};

/// Time-of-day suffix some month option values carry
pub const TIME_SUFFIX: &str = "00:00:00";

const DATE_FORMAT: &str = "%d/%m/%Y";

/// Parses a month option value such as `31/01/2023 00:00:00`
pub fn parse_option_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let value = value.strip_suffix(TIME_SUFFIX).unwrap_or(value).trim();
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Formats a date the way the server expects it
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Last calendar day of the date's month
pub fn month_end(date: NaiveDate) -> NaiveDate {
    date.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// Clamps `date` into `[min, max]`
pub fn clamp_date(date: NaiveDate, min: NaiveDate, max: NaiveDate) -> NaiveDate {
    if date < min {
        min
    } else if date > max {
        max
    } else {
        date
    }
}

/// Earliest and latest dates among month options
///
/// Options whose value is not a date (placeholders) are ignored. Returns
/// `None` when no option carries a date.
pub fn available_range(months: &[SelectionOption]) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = months
        .iter()
        .filter_map(|option| parse_option_date(&option.value));
    let first = dates.next()?;
    Some(dates.fold((first, first), |(min, max), date| {
        (min.min(date), max.max(date))
    }))
}

/// Resolves the month to request for a given target date
///
/// With `cap_dates` the date is first clamped to the available range; the
/// result is always normalized to its month end.
pub fn resolve_target(
    requested: NaiveDate,
    range: (NaiveDate, NaiveDate),
    cap_dates: bool,
) -> NaiveDate {
    let (min, max) = range;
    let date = if cap_dates {
        clamp_date(requested, min, max)
    } else {
        requested
    };
    month_end(date)
}

/// Value to put in the month field for `target`
///
/// Prefers the raw value of the option in the same month so the server sees
/// one of its own values; falls back to the formatted date.
pub fn month_value(months: &[SelectionOption], target: NaiveDate) -> String {
    months
        .iter()
        .find(|option| {
            parse_option_date(&option.value)
                .map(|date| date.year() == target.year() && date.month() == target.month())
                .unwrap_or(false)
        })
        .map(|option| option.value.clone())
        .unwrap_or_else(|| format_date(target))
}
