//! Selection of unconsumed ledger entries for a payroll period.
//!
//! Overtime is matched on the day the work happened. Reimbursements are
//! matched on when the claim was filed. The two filters differ on purpose.

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::EngineResult;
use crate::models::{DateRange, OvertimeEntry, ReimbursementEntry};
use crate::repository::PayrollRepository;

/// Unconsumed ledger entries eligible for one employee's payslip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerSelection {
    /// Overtime entries dated within the period.
    pub overtime: Vec<OvertimeEntry>,
    /// Reimbursements filed within the period.
    pub reimbursements: Vec<ReimbursementEntry>,
}

impl LedgerSelection {
    /// Returns true when neither ledger has anything to pay out.
    pub fn is_empty(&self) -> bool {
        self.overtime.is_empty() && self.reimbursements.is_empty()
    }

    /// Ids of the selected overtime entries.
    pub fn overtime_ids(&self) -> Vec<u64> {
        self.overtime.iter().map(|entry| entry.id).collect()
    }

    /// Ids of the selected reimbursement entries.
    pub fn reimbursement_ids(&self) -> Vec<u64> {
        self.reimbursements.iter().map(|entry| entry.id).collect()
    }

    /// Sum of the selected overtime hours, or `None` if the sum overflows.
    pub fn overtime_hours(&self) -> Option<Decimal> {
        self.overtime
            .iter()
            .try_fold(Decimal::ZERO, |total, entry| total.checked_add(entry.hours))
    }

    /// Sum of the selected reimbursement amounts, or `None` if the sum overflows.
    pub fn reimbursement_total(&self) -> Option<Decimal> {
        self.reimbursements
            .iter()
            .try_fold(Decimal::ZERO, |total, entry| total.checked_add(entry.amount))
    }
}

/// Selects the employee's unconsumed overtime and reimbursements for the range.
///
/// Returns empty lists when nothing matches.
pub async fn select_unconsumed(
    repo: &dyn PayrollRepository,
    employee_id: u64,
    range: DateRange,
) -> EngineResult<LedgerSelection> {
    let overtime = repo
        .list_unconsumed_overtime_in_range(employee_id, range)
        .await?;
    let reimbursements = repo
        .list_unconsumed_reimbursements_in_range(employee_id, range)
        .await?;

    debug!(
        employee_id,
        overtime = overtime.len(),
        reimbursements = reimbursements.len(),
        "Ledger entries selected"
    );

    Ok(LedgerSelection {
        overtime,
        reimbursements,
    })
}
