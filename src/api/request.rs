//! Request types for the Payslip Engine API.
//!
//! This module defines the JSON bodies and query strings accepted by the
//! admin and employee endpoints, and the validation applied to submissions
//! before they reach the store.

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::is_working_day;
use crate::config::SubmissionRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{NewOvertime, NewPayrollPeriod, NewReimbursement};

/// Body of `POST /admin/payroll-periods`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePeriodRequest {
    /// First day of the period, `YYYY-MM-DD`.
    pub start_date: NaiveDate,
    /// Last day of the period, `YYYY-MM-DD`.
    pub end_date: NaiveDate,
    /// The administrator creating the period.
    pub admin_id: u64,
}

impl From<CreatePeriodRequest> for NewPayrollPeriod {
    fn from(req: CreatePeriodRequest) -> Self {
        NewPayrollPeriod {
            start_date: req.start_date,
            end_date: req.end_date,
            created_by: req.admin_id,
        }
    }
}

/// Body of `POST /admin/run-payroll`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunPayrollRequest {
    /// The period to run.
    pub payroll_period_id: u64,
    /// The administrator running payroll.
    pub admin_id: u64,
}

/// Body of `POST /employee/attendance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRequest {
    /// The employee checking in.
    pub employee_id: u64,
}

impl AttendanceRequest {
    /// Rejects weekend check-ins unless the rules allow them.
    pub fn check_window(&self, rules: &SubmissionRules, now: DateTime<Utc>) -> EngineResult<()> {
        if !rules.allow_weekend_attendance && !is_working_day(now.date_naive()) {
            return Err(EngineError::SubmissionClosed {
                message: "Attendance submission is not allowed on weekends".to_string(),
            });
        }
        Ok(())
    }
}

/// Body of `POST /employee/overtime`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeRequest {
    /// The employee who worked the overtime.
    pub employee_id: u64,
    /// Hours worked, in `(0, max_overtime_hours]`.
    pub hours: Decimal,
    /// The day the overtime was worked, `YYYY-MM-DD`.
    pub date: NaiveDate,
}

impl OvertimeRequest {
    /// Validates the hours and the submission time.
    ///
    /// Hours are checked first, so an out-of-range request is a 400 even
    /// outside the submission window.
    pub fn validate(self, rules: &SubmissionRules, now: DateTime<Utc>) -> EngineResult<NewOvertime> {
        if self.hours <= Decimal::ZERO || self.hours > rules.max_overtime_hours {
            return Err(EngineError::InvalidSubmission {
                field: "hours".to_string(),
                message: format!(
                    "must be greater than 0 and at most {}",
                    rules.max_overtime_hours
                ),
            });
        }
        if now.hour() < rules.overtime_opens_at_hour {
            return Err(EngineError::SubmissionClosed {
                message: format!(
                    "Overtime can only be proposed from {:02}:00 UTC",
                    rules.overtime_opens_at_hour
                ),
            });
        }
        Ok(NewOvertime {
            employee_id: self.employee_id,
            date: self.date,
            hours: self.hours,
        })
    }
}

/// Body of `POST /employee/reimbursements`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReimbursementRequest {
    /// The employee claiming the reimbursement.
    pub employee_id: u64,
    /// Amount to reimburse; must be positive and within the configured maximum.
    pub amount: Decimal,
    /// What the reimbursement is for; must not be blank.
    pub description: String,
}

impl ReimbursementRequest {
    /// Validates the amount and description.
    pub fn validate(self, rules: &SubmissionRules) -> EngineResult<NewReimbursement> {
        if self.amount <= Decimal::ZERO {
            return Err(EngineError::InvalidSubmission {
                field: "amount".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.amount > rules.max_reimbursement_amount {
            return Err(EngineError::InvalidSubmission {
                field: "amount".to_string(),
                message: format!("must not exceed {}", rules.max_reimbursement_amount),
            });
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(EngineError::InvalidSubmission {
                field: "description".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(NewReimbursement {
            employee_id: self.employee_id,
            amount: self.amount,
            description: description.to_string(),
        })
    }
}

/// Query string of `GET /admin/payslips/summary`.
#[derive(Debug, Clone, Deserialize)]
pub struct PeriodQuery {
    /// The period to summarize.
    pub period_id: u64,
}

/// Query string of `GET /employee/payslip`.
#[derive(Debug, Clone, Deserialize)]
pub struct PayslipQuery {
    /// The employee whose payslip to fetch.
    pub employee_id: u64,
    /// The period the payslip covers.
    pub period_id: u64,
}
