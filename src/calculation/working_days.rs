//! Working day counting.
//!
//! A payroll period's working days are its Monday to Friday dates. The count
//! is the divisor of the daily rate, so it never drops below one.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::models::DateRange;

/// Returns true for Monday through Friday.
pub fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Counts the Monday to Friday dates in `[start, end]`, clamped to at least 1.
///
/// A reversed range has no days and therefore yields 1.
///
/// # Example
///
/// ```
/// use payslip_engine::calculation::count_working_days;
/// use chrono::NaiveDate;
///
/// // June 2025 starts on a Sunday and has 21 business days
/// let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
/// assert_eq!(count_working_days(start, end), 21);
///
/// // A weekend-only period still divides by one
/// let saturday = NaiveDate::from_ymd_opt(2025, 6, 7).unwrap();
/// let sunday = NaiveDate::from_ymd_opt(2025, 6, 8).unwrap();
/// assert_eq!(count_working_days(saturday, sunday), 1);
/// ```
pub fn count_working_days(start: NaiveDate, end: NaiveDate) -> u32 {
    let count = DateRange::new(start, end)
        .days()
        .filter(|day| is_working_day(*day))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX).max(1)
}
