//! Calculation logic for the Payslip Engine.
//!
//! This module contains the steps a payroll run applies to each employee:
//! counting working days and attendance, selecting unconsumed overtime and
//! reimbursements, pricing the payslip, and consuming the ledger entries it
//! paid out.

mod attendance;
mod consumption;
mod earnings;
mod ledger_selection;
mod working_days;

pub use attendance::count_attendance;
pub use consumption::{ConsumptionReceipt, consume_ledger};
pub use earnings::{EarningsInput, calculate_payslip};
pub use ledger_selection::{LedgerSelection, select_unconsumed};
pub use working_days::{count_working_days, is_working_day};
