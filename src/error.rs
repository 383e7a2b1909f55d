//! Error types for the Payslip Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while recording activity,
//! calculating payslips, and consuming ledger entries.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::LedgerKind;

/// The main error type for the Payslip Engine.
///
/// All fallible operations in the engine return this error type, making it
/// easy to handle errors consistently from the store up to the HTTP layer.
///
/// # Example
///
/// ```
/// use payslip_engine::error::EngineError;
///
/// let error = EngineError::PeriodNotFound { period_id: 7 };
/// assert_eq!(error.to_string(), "Payroll period not found: 7");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// No payroll period exists with the given id.
    #[error("Payroll period not found: {period_id}")]
    PeriodNotFound {
        /// The period id that was not found.
        period_id: u64,
    },

    /// The payroll period has already been run.
    #[error("Payroll for period {period_id} has already been run")]
    PeriodAlreadyRun {
        /// The period id that was already run.
        period_id: u64,
    },

    /// A payroll period was defined with an invalid date range.
    #[error("Invalid payroll period {start_date} to {end_date}: {message}")]
    InvalidPeriod {
        /// The requested start date.
        start_date: NaiveDate,
        /// The requested end date.
        end_date: NaiveDate,
        /// A description of what made the range invalid.
        message: String,
    },

    /// No employee exists with the given id.
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound {
        /// The employee id that was not found.
        employee_id: u64,
    },

    /// No payslip exists for the employee and period.
    #[error("Payslip not found for employee {employee_id} in period {period_id}")]
    PayslipNotFound {
        /// The employee id.
        employee_id: u64,
        /// The period id.
        period_id: u64,
    },

    /// A payslip already exists for the employee and period.
    #[error("Payslip already exists for employee {employee_id} in period {period_id}")]
    DuplicatePayslip {
        /// The employee id.
        employee_id: u64,
        /// The period id.
        period_id: u64,
    },

    /// A ledger entry referenced by a consumption batch does not exist.
    #[error("{kind} entry not found: {entry_id}")]
    EntryNotFound {
        /// Which ledger the entry belongs to.
        kind: LedgerKind,
        /// The missing entry id.
        entry_id: u64,
    },

    /// A ledger entry was already consumed by a payroll run.
    #[error("{kind} entry {entry_id} already consumed by period {consumed_by}")]
    EntryAlreadyConsumed {
        /// Which ledger the entry belongs to.
        kind: LedgerKind,
        /// The entry id.
        entry_id: u64,
        /// The period that consumed it.
        consumed_by: u64,
    },

    /// Attendance was already recorded for the employee on that day.
    #[error("Attendance already submitted for employee {employee_id} on {date}")]
    DuplicateAttendance {
        /// The employee id.
        employee_id: u64,
        /// The calendar day of the existing record.
        date: NaiveDate,
    },

    /// A submitted record failed validation.
    #[error("Invalid submission field '{field}': {message}")]
    InvalidSubmission {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A submission was made outside the window in which it is accepted.
    #[error("Submission not accepted: {message}")]
    SubmissionClosed {
        /// Why the submission window is closed.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A configuration value is out of range.
    #[error("Invalid configuration value '{field}': {message}")]
    InvalidConfig {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// A payslip figure exceeded the range of a decimal.
    #[error("Amount overflow computing {field} for employee {employee_id}")]
    AmountOverflow {
        /// The employee being paid.
        employee_id: u64,
        /// The figure that overflowed.
        field: String,
    },

    /// The payroll run queue is no longer accepting requests.
    #[error("Payroll run queue is closed")]
    QueueClosed,

    /// The backing store failed.
    #[error("Store error: {message}")]
    StoreError {
        /// A description of the store failure.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
