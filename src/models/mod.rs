//! Core data models for the Payslip Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod audit;
mod employee;
mod ledger;
mod payroll_period;
mod payslip;

pub use audit::{ACTION_CREATED_PERIOD, ACTION_RAN_PAYROLL, ActorType, AuditEntry, AuditRecord};
pub use employee::{Employee, NewEmployee};
pub use ledger::{
    AttendanceRecord, LedgerKind, NewOvertime, NewReimbursement, OvertimeEntry, ReimbursementEntry,
};
pub use payroll_period::{DateRange, NewPayrollPeriod, PayrollPeriod};
pub use payslip::{
    AttendanceBreakdown, EmployeePayout, OvertimeBreakdown, Payslip, PayslipBreakdown,
    PeriodPayout, ReimbursementBreakdown, SalaryBreakdown,
};
