//! Payslip models for the Payslip Engine.
//!
//! This module contains the [`Payslip`] produced for each employee by a
//! payroll run, the machine-readable [`PayslipBreakdown`] serialized into its
//! detail field, and the [`PeriodPayout`] summary across a period.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Attendance figures in a payslip breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceBreakdown {
    /// Days the employee checked in during the period.
    pub days_attended: u32,
    /// Business days available in the period.
    pub total_working_days: u32,
}

/// Salary figures in a payslip breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryBreakdown {
    /// The employee's base salary.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub base: Decimal,
    /// The base salary prorated by attendance.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub prorated: Decimal,
}

/// Overtime figures in a payslip breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeBreakdown {
    /// Total overtime hours paid.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub hours: Decimal,
    /// Total overtime pay.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub pay: Decimal,
}

/// Reimbursement figures in a payslip breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReimbursementBreakdown {
    /// Total reimbursements paid.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total: Decimal,
}

/// The structured breakdown stored in [`Payslip::payslip_details`].
///
/// The field layout is fixed so downstream consumers can rely on it:
///
/// ```text
/// {"attendance":{"daysAttended":..,"totalWorkingDays":..},
///  "salary":{"base":..,"prorated":..},
///  "overtime":{"hours":..,"pay":..},
///  "reimbursements":{"total":..}}
/// ```
///
/// Amounts and hours are JSON numbers rounded to two decimal places for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipBreakdown {
    /// Attendance counts.
    pub attendance: AttendanceBreakdown,
    /// Salary figures.
    pub salary: SalaryBreakdown,
    /// Overtime figures.
    pub overtime: OvertimeBreakdown,
    /// Reimbursement total.
    pub reimbursements: ReimbursementBreakdown,
}

/// The payslip generated for one employee in one payroll period.
///
/// Exactly one payslip exists per (employee, period) pair. It is never
/// mutated after the run that created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payslip {
    /// The employee the payslip is for.
    pub employee_id: u64,
    /// The payroll period the payslip covers.
    pub payroll_period_id: u64,
    /// Snapshot of the employee's base salary at run time.
    pub base_salary: Decimal,
    /// Business days in the period (at least 1).
    pub working_days: u32,
    /// Days the employee attended.
    pub days_attended: u32,
    /// Base salary prorated by attendance.
    pub prorated_salary: Decimal,
    /// Overtime hours paid.
    pub overtime_hours: Decimal,
    /// Overtime pay.
    pub overtime_pay: Decimal,
    /// Reimbursements paid.
    pub reimbursement: Decimal,
    /// Prorated salary plus overtime pay plus reimbursements.
    pub take_home_pay: Decimal,
    /// Serialized [`PayslipBreakdown`].
    pub payslip_details: String,
    /// The administrator who ran payroll.
    pub generated_by: u64,
    /// Address the payroll run was triggered from.
    #[serde(skip_serializing)]
    #[serde(default)]
    pub request_origin: String,
    /// When the payslip was generated.
    pub generated_at: DateTime<Utc>,
}

impl Payslip {
    /// Parses the serialized breakdown.
    pub fn breakdown(&self) -> Result<PayslipBreakdown, serde_json::Error> {
        serde_json::from_str(&self.payslip_details)
    }

    /// Sum of the three take-home components.
    pub fn components_total(&self) -> Decimal {
        self.prorated_salary + self.overtime_pay + self.reimbursement
    }
}

/// One employee's line in a period payout summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayout {
    /// The employee.
    pub employee_id: u64,
    /// Their take-home pay for the period.
    pub take_home_pay: Decimal,
}

/// Take-home totals for every payslip in a period.
///
/// # Example
///
/// ```
/// use payslip_engine::models::PeriodPayout;
///
/// let summary = PeriodPayout::from_payslips(3, &[]);
/// assert!(summary.employee_payslips.is_empty());
/// assert_eq!(summary.total_payout, rust_decimal::Decimal::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodPayout {
    /// The payroll period.
    pub payroll_period_id: u64,
    /// Sum of every employee's take-home pay.
    pub total_payout: Decimal,
    /// Per-employee take-home pay.
    pub employee_payslips: Vec<EmployeePayout>,
}

impl PeriodPayout {
    /// Summarizes a period's payslips.
    pub fn from_payslips(payroll_period_id: u64, payslips: &[Payslip]) -> Self {
        let employee_payslips: Vec<EmployeePayout> = payslips
            .iter()
            .map(|p| EmployeePayout {
                employee_id: p.employee_id,
                take_home_pay: p.take_home_pay,
            })
            .collect();
        let total_payout = employee_payslips.iter().map(|p| p.take_home_pay).sum();

        Self {
            payroll_period_id,
            total_payout,
            employee_payslips,
        }
    }
}
