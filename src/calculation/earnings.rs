//! Payslip earnings calculation.
//!
//! This module turns one employee's salary, attendance and selected ledger
//! entries into a [`Payslip`]. All arithmetic uses [`Decimal`]; nothing is
//! rounded except the display copy written into the breakdown.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::config::PayrollRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceBreakdown, Employee, OvertimeBreakdown, Payslip, PayslipBreakdown,
    ReimbursementBreakdown, SalaryBreakdown,
};

use super::LedgerSelection;

/// Everything needed to price one employee's period.
#[derive(Debug, Clone)]
pub struct EarningsInput<'a> {
    /// The employee being paid.
    pub employee: &'a Employee,
    /// The payroll period being run.
    pub period_id: u64,
    /// Business days in the period.
    pub working_days: u32,
    /// Days the employee attended.
    pub days_attended: u32,
    /// Unconsumed ledger entries selected for this payslip.
    pub selection: &'a LedgerSelection,
    /// The administrator running payroll.
    pub generated_by: u64,
    /// Address the run was triggered from.
    pub request_origin: &'a str,
    /// Timestamp stamped on the payslip.
    pub generated_at: DateTime<Utc>,
}

/// Rounds to two places and pads so `5` displays as `5.00`.
fn display_amount(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp(2);
    rounded.rescale(2);
    rounded
}

/// Calculates an employee's payslip for a period.
///
/// # Formula
///
/// ```text
/// daily_rate      = salary / working_days
/// prorated_salary = daily_rate * days_attended
/// hourly_rate     = daily_rate / standard_hours_per_day
/// overtime_pay    = overtime_hours * hourly_rate * overtime_multiplier
/// take_home_pay   = prorated_salary + overtime_pay + reimbursements
/// ```
///
/// Attendance above the working-day count is paid as-is. A figure that
/// leaves the range of [`Decimal`] fails with [`EngineError::AmountOverflow`].
///
/// # Example
///
/// ```
/// use payslip_engine::calculation::{EarningsInput, LedgerSelection, calculate_payslip};
/// use payslip_engine::config::PayrollRules;
/// use payslip_engine::models::Employee;
/// use chrono::Utc;
/// use rust_decimal::Decimal;
///
/// let employee = Employee {
///     id: 1,
///     username: "employee1".to_string(),
///     salary: Decimal::new(10_500_000, 0),
/// };
/// let selection = LedgerSelection::default();
///
/// let payslip = calculate_payslip(
///     &EarningsInput {
///         employee: &employee,
///         period_id: 1,
///         working_days: 21,
///         days_attended: 21,
///         selection: &selection,
///         generated_by: 1,
///         request_origin: "127.0.0.1",
///         generated_at: Utc::now(),
///     },
///     &PayrollRules::default(),
/// )
/// .unwrap();
///
/// assert_eq!(payslip.take_home_pay, Decimal::new(10_500_000, 0));
/// ```
pub fn calculate_payslip(input: &EarningsInput<'_>, rules: &PayrollRules) -> EngineResult<Payslip> {
    let employee_id = input.employee.id;
    let overflow = |field: &str| EngineError::AmountOverflow {
        employee_id,
        field: field.to_string(),
    };

    let salary = input.employee.salary;
    let working_days = input.working_days.max(1);

    let daily_rate = salary
        .checked_div(Decimal::from(working_days))
        .ok_or_else(|| overflow("daily_rate"))?;
    let prorated_salary = daily_rate
        .checked_mul(Decimal::from(input.days_attended))
        .ok_or_else(|| overflow("prorated_salary"))?;

    let overtime_hours = input
        .selection
        .overtime_hours()
        .ok_or_else(|| overflow("overtime_hours"))?;
    let hourly_rate = daily_rate
        .checked_div(rules.standard_hours_per_day())
        .ok_or_else(|| overflow("hourly_rate"))?;
    let overtime_pay = overtime_hours
        .checked_mul(hourly_rate)
        .and_then(|pay| pay.checked_mul(rules.overtime_multiplier()))
        .ok_or_else(|| overflow("overtime_pay"))?;

    let reimbursement = input
        .selection
        .reimbursement_total()
        .ok_or_else(|| overflow("reimbursement"))?;
    let take_home_pay = prorated_salary
        .checked_add(overtime_pay)
        .and_then(|total| total.checked_add(reimbursement))
        .ok_or_else(|| overflow("take_home_pay"))?;

    let breakdown = PayslipBreakdown {
        attendance: AttendanceBreakdown {
            days_attended: input.days_attended,
            total_working_days: working_days,
        },
        salary: SalaryBreakdown {
            base: display_amount(salary),
            prorated: display_amount(prorated_salary),
        },
        overtime: OvertimeBreakdown {
            hours: display_amount(overtime_hours),
            pay: display_amount(overtime_pay),
        },
        reimbursements: ReimbursementBreakdown {
            total: display_amount(reimbursement),
        },
    };
    // string keys and scalar values only, so this cannot fail
    let payslip_details = serde_json::to_string(&breakdown).unwrap_or_default();

    Ok(Payslip {
        employee_id,
        payroll_period_id: input.period_id,
        base_salary: salary,
        working_days,
        days_attended: input.days_attended,
        prorated_salary,
        overtime_hours,
        overtime_pay,
        reimbursement,
        take_home_pay,
        payslip_details,
        generated_by: input.generated_by,
        request_origin: input.request_origin.to_string(),
        generated_at: input.generated_at,
    })
}
