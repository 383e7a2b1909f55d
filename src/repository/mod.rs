//! Storage interfaces for the Payslip Engine.
//!
//! The payroll core only sees [`PayrollRepository`]: the eight operations a
//! run needs. The HTTP layer records activity through [`RecordStore`].
//! [`InMemoryRepository`] implements both.

mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::EngineResult;
use crate::models::{
    AttendanceRecord, AuditEntry, AuditRecord, DateRange, Employee, NewEmployee, NewOvertime,
    NewPayrollPeriod, NewReimbursement, OvertimeEntry, PayrollPeriod, Payslip, ReimbursementEntry,
};

pub use memory::InMemoryRepository;

/// Ledger entries to stamp as consumed by one payroll period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumptionBatch {
    /// The period whose run is paying the entries out.
    pub period_id: u64,
    /// Overtime entry ids to consume.
    pub overtime_ids: Vec<u64>,
    /// Reimbursement entry ids to consume.
    pub reimbursement_ids: Vec<u64>,
}

impl ConsumptionBatch {
    /// Returns true when there is nothing to consume.
    pub fn is_empty(&self) -> bool {
        self.overtime_ids.is_empty() && self.reimbursement_ids.is_empty()
    }
}

/// The storage operations a payroll run depends on.
#[async_trait]
pub trait PayrollRepository: Send + Sync {
    /// Fetches a period by id.
    async fn fetch_period(&self, period_id: u64) -> EngineResult<Option<PayrollPeriod>>;

    /// Fetches every employee, ordered by id.
    async fn fetch_all_employees(&self) -> EngineResult<Vec<Employee>>;

    /// Counts the employee's attendance records whose check-in falls in the range.
    async fn count_attendance_in_range(&self, employee_id: u64, range: DateRange)
    -> EngineResult<u32>;

    /// Lists the employee's unconsumed overtime entries dated within the range.
    async fn list_unconsumed_overtime_in_range(
        &self,
        employee_id: u64,
        range: DateRange,
    ) -> EngineResult<Vec<OvertimeEntry>>;

    /// Lists the employee's unconsumed reimbursements created within the range.
    async fn list_unconsumed_reimbursements_in_range(
        &self,
        employee_id: u64,
        range: DateRange,
    ) -> EngineResult<Vec<ReimbursementEntry>>;

    /// Stamps every entry in the batch as consumed by the batch's period.
    ///
    /// All-or-nothing: if any entry is missing or already consumed, no entry
    /// is changed and the error names the offending entry.
    async fn mark_consumed(&self, batch: &ConsumptionBatch) -> EngineResult<()>;

    /// Persists a payslip. Fails with `DuplicatePayslip` if one already
    /// exists for the employee and period.
    async fn create_payslip(&self, payslip: Payslip) -> EngineResult<()>;

    /// Sets the period's run flag. Fails with `PeriodAlreadyRun` if another
    /// caller set it first.
    async fn claim_period(&self, period_id: u64) -> EngineResult<()>;
}

/// Record-keeping operations behind the HTTP API.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Registers an employee; usernames are unique.
    async fn create_employee(&self, employee: NewEmployee) -> EngineResult<Employee>;

    /// Looks up an employee by id.
    async fn find_employee(&self, employee_id: u64) -> EngineResult<Option<Employee>>;

    /// Looks up an employee by username.
    async fn find_employee_by_username(&self, username: &str) -> EngineResult<Option<Employee>>;

    /// Creates a payroll period.
    async fn create_period(
        &self,
        period: NewPayrollPeriod,
        created_at: DateTime<Utc>,
    ) -> EngineResult<PayrollPeriod>;

    /// Records a check-in. At most one per employee per calendar day.
    async fn record_attendance(
        &self,
        employee_id: u64,
        check_in: DateTime<Utc>,
    ) -> EngineResult<AttendanceRecord>;

    /// Records an overtime entry.
    async fn submit_overtime(
        &self,
        overtime: NewOvertime,
        submitted_at: DateTime<Utc>,
    ) -> EngineResult<OvertimeEntry>;

    /// Records a reimbursement claim.
    async fn submit_reimbursement(
        &self,
        reimbursement: NewReimbursement,
        created_at: DateTime<Utc>,
    ) -> EngineResult<ReimbursementEntry>;

    /// Looks up the payslip for an employee and period.
    async fn find_payslip(&self, employee_id: u64, period_id: u64)
    -> EngineResult<Option<Payslip>>;

    /// Lists every payslip in a period, ordered by employee id.
    async fn list_payslips_for_period(&self, period_id: u64) -> EngineResult<Vec<Payslip>>;

    /// Appends an audit record.
    async fn append_audit(&self, entry: AuditEntry) -> EngineResult<AuditRecord>;

    /// Lists audit records, newest first.
    async fn list_audit_records(&self) -> EngineResult<Vec<AuditRecord>>;
}
