//! Activity records: attendance, overtime and reimbursements.
//!
//! Overtime and reimbursement entries form the payroll ledger. Each entry is
//! paid out at most once: a payroll run stamps `consumed_by` with its period
//! id and the stamp is never cleared or reassigned.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifies which ledger an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    /// Overtime hours.
    Overtime,
    /// Reimbursement claims.
    Reimbursement,
}

impl std::fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerKind::Overtime => write!(f, "overtime"),
            LedgerKind::Reimbursement => write!(f, "reimbursement"),
        }
    }
}

/// A single day's presence for an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    /// Unique identifier for the record.
    pub id: u64,
    /// The employee who checked in.
    pub employee_id: u64,
    /// When the employee checked in.
    pub check_in: DateTime<Utc>,
}

/// Overtime worked by an employee on a calendar date.
///
/// # Example
///
/// ```
/// use payslip_engine::models::OvertimeEntry;
/// use chrono::{NaiveDate, Utc};
/// use rust_decimal::Decimal;
///
/// let entry = OvertimeEntry {
///     id: 1,
///     employee_id: 1,
///     date: NaiveDate::from_ymd_opt(2025, 6, 5).unwrap(),
///     hours: Decimal::new(3, 0),
///     consumed_by: None,
///     submitted_at: Utc::now(),
/// };
/// assert!(!entry.is_consumed());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeEntry {
    /// Unique identifier for the entry.
    pub id: u64,
    /// The employee who worked the overtime.
    pub employee_id: u64,
    /// The day the overtime was worked.
    pub date: NaiveDate,
    /// Hours worked beyond the ordinary day.
    pub hours: Decimal,
    /// The period whose run paid this entry out, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumed_by: Option<u64>,
    /// When the entry was submitted.
    pub submitted_at: DateTime<Utc>,
}

impl OvertimeEntry {
    /// Returns true once a payroll run has paid this entry out.
    pub fn is_consumed(&self) -> bool {
        self.consumed_by.is_some()
    }
}

/// A reimbursement claimed by an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReimbursementEntry {
    /// Unique identifier for the entry.
    pub id: u64,
    /// The employee claiming the reimbursement.
    pub employee_id: u64,
    /// The amount to reimburse.
    pub amount: Decimal,
    /// What the reimbursement is for.
    pub description: String,
    /// When the claim was created; payroll selection keys on this.
    pub created_at: DateTime<Utc>,
    /// The period whose run paid this entry out, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumed_by: Option<u64>,
}

impl ReimbursementEntry {
    /// Returns true once a payroll run has paid this entry out.
    pub fn is_consumed(&self) -> bool {
        self.consumed_by.is_some()
    }
}

/// Fields submitted for a new overtime entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOvertime {
    /// The employee who worked the overtime.
    pub employee_id: u64,
    /// The day the overtime was worked.
    pub date: NaiveDate,
    /// Hours worked beyond the ordinary day.
    pub hours: Decimal,
}

/// Fields submitted for a new reimbursement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReimbursement {
    /// The employee claiming the reimbursement.
    pub employee_id: u64,
    /// The amount to reimburse.
    pub amount: Decimal,
    /// What the reimbursement is for.
    pub description: String,
}
