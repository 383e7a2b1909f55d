//! Payroll run orchestration and background triggering.
//!
//! [`PayrollRunner`] executes a run end to end. [`RunTrigger`] hands runs to
//! a background worker so HTTP callers return before the run finishes.

mod runner;
mod trigger;

pub use runner::{PayrollRunner, RunOutcome, RunRequest, RunSummary};
pub use trigger::RunTrigger;
