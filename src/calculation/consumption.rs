//! Ledger consumption.
//!
//! Marks the entries paid out on a payslip as consumed by the period, so no
//! later run can select them again.

use tracing::debug;

use crate::error::EngineResult;
use crate::repository::{ConsumptionBatch, PayrollRepository};

use super::LedgerSelection;

/// What a consumption call marked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumptionReceipt {
    /// Overtime entries now owned by the period.
    pub overtime_ids: Vec<u64>,
    /// Reimbursement entries now owned by the period.
    pub reimbursement_ids: Vec<u64>,
}

impl ConsumptionReceipt {
    /// Total number of entries marked.
    pub fn len(&self) -> usize {
        self.overtime_ids.len() + self.reimbursement_ids.len()
    }

    /// Returns true when nothing was marked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Marks every entry in the selection as consumed by `period_id`.
///
/// The store applies the whole batch or none of it. An empty selection makes
/// no store call.
pub async fn consume_ledger(
    repo: &dyn PayrollRepository,
    selection: &LedgerSelection,
    period_id: u64,
) -> EngineResult<ConsumptionReceipt> {
    let batch = ConsumptionBatch {
        period_id,
        overtime_ids: selection.overtime_ids(),
        reimbursement_ids: selection.reimbursement_ids(),
    };

    if batch.is_empty() {
        return Ok(ConsumptionReceipt::default());
    }

    repo.mark_consumed(&batch).await?;
    debug!(
        period_id,
        overtime = batch.overtime_ids.len(),
        reimbursements = batch.reimbursement_ids.len(),
        "Ledger consumed"
    );

    Ok(ConsumptionReceipt {
        overtime_ids: batch.overtime_ids,
        reimbursement_ids: batch.reimbursement_ids,
    })
}
