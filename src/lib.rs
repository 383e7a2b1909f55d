//! Payslip Engine
//!
//! This crate computes employee payslips for a payroll period from base
//! salary, attendance, overtime and reimbursements, and marks the overtime and
//! reimbursement entries it pays out as consumed so no later run pays them
//! again. Runs are triggered over HTTP and executed by a background worker.

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod api;
pub mod audit;
pub mod calculation;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod payroll;
pub mod repository;
