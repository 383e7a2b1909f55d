//! Payroll period and date range models.
//!
//! This module contains the [`PayrollPeriod`] type that defines the calendar
//! window a payroll run covers, and the [`DateRange`] used to filter
//! attendance and ledger records against that window.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// An inclusive range of calendar dates.
///
/// Date-keyed records (overtime) match when their date lies in
/// `[start, end]`. Instant-keyed records (attendance, reimbursements) match
/// when they fall in `[start 00:00 UTC, end + 1 day 00:00 UTC)`.
///
/// # Example
///
/// ```
/// use payslip_engine::models::DateRange;
/// use chrono::{NaiveDate, TimeZone, Utc};
///
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
/// );
///
/// assert!(range.contains_date(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()));
/// assert!(range.contains_instant(Utc.with_ymd_and_hms(2025, 6, 30, 23, 59, 59).unwrap()));
/// assert!(!range.contains_instant(Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// First day of the range (inclusive).
    pub start: NaiveDate,
    /// Last day of the range (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range from `start` to `end`, both inclusive.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Checks if a calendar date falls within the range (inclusive).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// The first instant of the range: midnight UTC on the start date.
    pub fn window_start(&self) -> DateTime<Utc> {
        self.start.and_time(NaiveTime::MIN).and_utc()
    }

    /// Checks if an instant falls within `[start 00:00, end + 1 day 00:00)`.
    pub fn contains_instant(&self, at: DateTime<Utc>) -> bool {
        at >= self.window_start() && at.date_naive() <= self.end
    }

    /// Iterates every calendar day in the range, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }
}

/// Represents a payroll period created by an administrator.
///
/// A period is mutated exactly once by the engine: the `is_run` flag flips
/// to `true` when a run claims it. It is never deleted.
///
/// # Example
///
/// ```
/// use payslip_engine::models::PayrollPeriod;
/// use chrono::{NaiveDate, Utc};
///
/// let period = PayrollPeriod {
///     id: 1,
///     start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
///     is_run: false,
///     created_by: 1,
///     created_at: Utc::now(),
/// };
///
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()));
/// assert!(!period.contains_date(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollPeriod {
    /// Unique identifier for the period.
    pub id: u64,
    /// The start date of the period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the period (inclusive).
    pub end_date: NaiveDate,
    /// Whether a payroll run has claimed this period.
    pub is_run: bool,
    /// The administrator who created the period.
    pub created_by: u64,
    /// When the period was created.
    pub created_at: DateTime<Utc>,
}

impl PayrollPeriod {
    /// Returns the period's dates as a [`DateRange`].
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    /// Checks if a given date falls within this period (inclusive).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.range().contains_date(date)
    }
}

/// Fields required to create a payroll period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayrollPeriod {
    /// The start date of the period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the period (inclusive).
    pub end_date: NaiveDate,
    /// The administrator creating the period.
    pub created_by: u64,
}

impl NewPayrollPeriod {
    /// Rejects ranges whose end precedes their start.
    pub fn validate(&self) -> EngineResult<()> {
        if self.start_date > self.end_date {
            return Err(EngineError::InvalidPeriod {
                start_date: self.start_date,
                end_date: self.end_date,
                message: "end date precedes start date".to_string(),
            });
        }
        Ok(())
    }

    /// Attaches a store-assigned id and creation time.
    pub fn into_period(self, id: u64, created_at: DateTime<Utc>) -> PayrollPeriod {
        PayrollPeriod {
            id,
            start_date: self.start_date,
            end_date: self.end_date,
            is_run: false,
            created_by: self.created_by,
            created_at,
        }
    }
}
