//! In-memory implementation of the storage traits.
//!
//! All state sits behind a single [`RwLock`]. Every mutating operation takes
//! the write lock for its whole check-then-write sequence, which is what makes
//! `claim_period` and `mark_consumed` compare-and-set operations.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, AuditEntry, AuditRecord, DateRange, Employee, LedgerKind, NewEmployee,
    NewOvertime, NewPayrollPeriod, NewReimbursement, OvertimeEntry, PayrollPeriod, Payslip,
    ReimbursementEntry,
};

use super::{ConsumptionBatch, PayrollRepository, RecordStore};

#[derive(Debug, Default)]
struct Sequences {
    employee: u64,
    period: u64,
    attendance: u64,
    overtime: u64,
    reimbursement: u64,
    audit: u64,
}

fn next_id(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

#[derive(Debug, Default)]
struct StoreState {
    employees: BTreeMap<u64, Employee>,
    periods: BTreeMap<u64, PayrollPeriod>,
    attendance: BTreeMap<u64, AttendanceRecord>,
    overtime: BTreeMap<u64, OvertimeEntry>,
    reimbursements: BTreeMap<u64, ReimbursementEntry>,
    // keyed by (period id, employee id)
    payslips: BTreeMap<(u64, u64), Payslip>,
    audit: Vec<AuditRecord>,
    sequences: Sequences,
}

impl StoreState {
    fn require_employee(&self, employee_id: u64) -> EngineResult<()> {
        if self.employees.contains_key(&employee_id) {
            Ok(())
        } else {
            Err(EngineError::EmployeeNotFound { employee_id })
        }
    }

    fn check_consumable(&self, batch: &ConsumptionBatch) -> EngineResult<()> {
        for &entry_id in &batch.overtime_ids {
            let entry = self
                .overtime
                .get(&entry_id)
                .ok_or(EngineError::EntryNotFound {
                    kind: LedgerKind::Overtime,
                    entry_id,
                })?;
            if let Some(consumed_by) = entry.consumed_by {
                return Err(EngineError::EntryAlreadyConsumed {
                    kind: LedgerKind::Overtime,
                    entry_id,
                    consumed_by,
                });
            }
        }

        for &entry_id in &batch.reimbursement_ids {
            let entry = self
                .reimbursements
                .get(&entry_id)
                .ok_or(EngineError::EntryNotFound {
                    kind: LedgerKind::Reimbursement,
                    entry_id,
                })?;
            if let Some(consumed_by) = entry.consumed_by {
                return Err(EngineError::EntryAlreadyConsumed {
                    kind: LedgerKind::Reimbursement,
                    entry_id,
                    consumed_by,
                });
            }
        }

        Ok(())
    }
}

/// A process-local store implementing [`PayrollRepository`] and [`RecordStore`].
///
/// # Example
///
/// ```
/// use payslip_engine::models::NewEmployee;
/// use payslip_engine::repository::{InMemoryRepository, PayrollRepository, RecordStore};
/// use rust_decimal::Decimal;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let store = InMemoryRepository::new();
/// store
///     .create_employee(NewEmployee {
///         username: "employee1".to_string(),
///         salary: Decimal::new(5_000_000, 0),
///     })
///     .await
///     .unwrap();
/// assert_eq!(store.fetch_all_employees().await.unwrap().len(), 1);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: RwLock<StoreState>,
}

impl InMemoryRepository {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an overtime entry, consumed or not.
    pub async fn overtime_entry(&self, entry_id: u64) -> Option<OvertimeEntry> {
        self.state.read().await.overtime.get(&entry_id).cloned()
    }

    /// Looks up a reimbursement entry, consumed or not.
    pub async fn reimbursement_entry(&self, entry_id: u64) -> Option<ReimbursementEntry> {
        self.state.read().await.reimbursements.get(&entry_id).cloned()
    }

    /// Total number of payslips across all periods.
    pub async fn payslip_count(&self) -> usize {
        self.state.read().await.payslips.len()
    }
}

#[async_trait]
impl PayrollRepository for InMemoryRepository {
    async fn fetch_period(&self, period_id: u64) -> EngineResult<Option<PayrollPeriod>> {
        Ok(self.state.read().await.periods.get(&period_id).cloned())
    }

    async fn fetch_all_employees(&self) -> EngineResult<Vec<Employee>> {
        Ok(self.state.read().await.employees.values().cloned().collect())
    }

    async fn count_attendance_in_range(
        &self,
        employee_id: u64,
        range: DateRange,
    ) -> EngineResult<u32> {
        let state = self.state.read().await;
        let count = state
            .attendance
            .values()
            .filter(|record| record.employee_id == employee_id)
            .filter(|record| range.contains_instant(record.check_in))
            .count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn list_unconsumed_overtime_in_range(
        &self,
        employee_id: u64,
        range: DateRange,
    ) -> EngineResult<Vec<OvertimeEntry>> {
        let state = self.state.read().await;
        Ok(state
            .overtime
            .values()
            .filter(|entry| entry.employee_id == employee_id)
            .filter(|entry| range.contains_date(entry.date))
            .filter(|entry| !entry.is_consumed())
            .cloned()
            .collect())
    }

    async fn list_unconsumed_reimbursements_in_range(
        &self,
        employee_id: u64,
        range: DateRange,
    ) -> EngineResult<Vec<ReimbursementEntry>> {
        let state = self.state.read().await;
        Ok(state
            .reimbursements
            .values()
            .filter(|entry| entry.employee_id == employee_id)
            .filter(|entry| range.contains_instant(entry.created_at))
            .filter(|entry| !entry.is_consumed())
            .cloned()
            .collect())
    }

    async fn mark_consumed(&self, batch: &ConsumptionBatch) -> EngineResult<()> {
        let mut state = self.state.write().await;
        state.check_consumable(batch)?;

        for entry_id in &batch.overtime_ids {
            if let Some(entry) = state.overtime.get_mut(entry_id) {
                entry.consumed_by = Some(batch.period_id);
            }
        }
        for entry_id in &batch.reimbursement_ids {
            if let Some(entry) = state.reimbursements.get_mut(entry_id) {
                entry.consumed_by = Some(batch.period_id);
            }
        }

        debug!(
            period_id = batch.period_id,
            overtime = batch.overtime_ids.len(),
            reimbursements = batch.reimbursement_ids.len(),
            "Ledger entries consumed"
        );
        Ok(())
    }

    async fn create_payslip(&self, payslip: Payslip) -> EngineResult<()> {
        let mut state = self.state.write().await;
        let key = (payslip.payroll_period_id, payslip.employee_id);
        if state.payslips.contains_key(&key) {
            return Err(EngineError::DuplicatePayslip {
                employee_id: payslip.employee_id,
                period_id: payslip.payroll_period_id,
            });
        }
        state.payslips.insert(key, payslip);
        Ok(())
    }

    async fn claim_period(&self, period_id: u64) -> EngineResult<()> {
        let mut state = self.state.write().await;
        let period = state
            .periods
            .get_mut(&period_id)
            .ok_or(EngineError::PeriodNotFound { period_id })?;
        if period.is_run {
            return Err(EngineError::PeriodAlreadyRun { period_id });
        }
        period.is_run = true;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for InMemoryRepository {
    async fn create_employee(&self, employee: NewEmployee) -> EngineResult<Employee> {
        let mut state = self.state.write().await;
        if state
            .employees
            .values()
            .any(|existing| existing.username == employee.username)
        {
            return Err(EngineError::InvalidSubmission {
                field: "username".to_string(),
                message: format!("'{}' is already taken", employee.username),
            });
        }
        let id = next_id(&mut state.sequences.employee);
        let employee = employee.into_employee(id);
        state.employees.insert(id, employee.clone());
        Ok(employee)
    }

    async fn find_employee(&self, employee_id: u64) -> EngineResult<Option<Employee>> {
        Ok(self.state.read().await.employees.get(&employee_id).cloned())
    }

    async fn find_employee_by_username(&self, username: &str) -> EngineResult<Option<Employee>> {
        Ok(self
            .state
            .read()
            .await
            .employees
            .values()
            .find(|employee| employee.username == username)
            .cloned())
    }

    async fn create_period(
        &self,
        period: NewPayrollPeriod,
        created_at: DateTime<Utc>,
    ) -> EngineResult<PayrollPeriod> {
        period.validate()?;
        let mut state = self.state.write().await;
        let id = next_id(&mut state.sequences.period);
        let period = period.into_period(id, created_at);
        state.periods.insert(id, period.clone());
        Ok(period)
    }

    async fn record_attendance(
        &self,
        employee_id: u64,
        check_in: DateTime<Utc>,
    ) -> EngineResult<AttendanceRecord> {
        let mut state = self.state.write().await;
        state.require_employee(employee_id)?;

        let day = check_in.date_naive();
        if state
            .attendance
            .values()
            .any(|record| record.employee_id == employee_id && record.check_in.date_naive() == day)
        {
            return Err(EngineError::DuplicateAttendance {
                employee_id,
                date: day,
            });
        }

        let id = next_id(&mut state.sequences.attendance);
        let record = AttendanceRecord {
            id,
            employee_id,
            check_in,
        };
        state.attendance.insert(id, record.clone());
        Ok(record)
    }

    async fn submit_overtime(
        &self,
        overtime: NewOvertime,
        submitted_at: DateTime<Utc>,
    ) -> EngineResult<OvertimeEntry> {
        let mut state = self.state.write().await;
        state.require_employee(overtime.employee_id)?;

        let id = next_id(&mut state.sequences.overtime);
        let entry = OvertimeEntry {
            id,
            employee_id: overtime.employee_id,
            date: overtime.date,
            hours: overtime.hours,
            consumed_by: None,
            submitted_at,
        };
        state.overtime.insert(id, entry.clone());
        Ok(entry)
    }

    async fn submit_reimbursement(
        &self,
        reimbursement: NewReimbursement,
        created_at: DateTime<Utc>,
    ) -> EngineResult<ReimbursementEntry> {
        let mut state = self.state.write().await;
        state.require_employee(reimbursement.employee_id)?;

        let id = next_id(&mut state.sequences.reimbursement);
        let entry = ReimbursementEntry {
            id,
            employee_id: reimbursement.employee_id,
            amount: reimbursement.amount,
            description: reimbursement.description,
            created_at,
            consumed_by: None,
        };
        state.reimbursements.insert(id, entry.clone());
        Ok(entry)
    }

    async fn find_payslip(
        &self,
        employee_id: u64,
        period_id: u64,
    ) -> EngineResult<Option<Payslip>> {
        Ok(self
            .state
            .read()
            .await
            .payslips
            .get(&(period_id, employee_id))
            .cloned())
    }

    async fn list_payslips_for_period(&self, period_id: u64) -> EngineResult<Vec<Payslip>> {
        Ok(self
            .state
            .read()
            .await
            .payslips
            .range((period_id, 0)..=(period_id, u64::MAX))
            .map(|(_, payslip)| payslip.clone())
            .collect())
    }

    async fn append_audit(&self, entry: AuditEntry) -> EngineResult<AuditRecord> {
        let mut state = self.state.write().await;
        let id = next_id(&mut state.sequences.audit);
        let record = entry.into_record(id, Utc::now());
        state.audit.push(record.clone());
        Ok(record)
    }

    async fn list_audit_records(&self) -> EngineResult<Vec<AuditRecord>> {
        Ok(self.state.read().await.audit.iter().rev().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActorType, NewEmployee};
    use chrono::{NaiveDate, TimeZone};
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn june_2025() -> DateRange {
        DateRange::new(date(2025, 6, 1), date(2025, 6, 30))
    }

    async fn store_with_employee() -> (InMemoryRepository, Employee) {
        let store = InMemoryRepository::new();
        let employee = store
            .create_employee(NewEmployee {
                username: "employee1".to_string(),
                salary: Decimal::new(10_500_000, 0),
            })
            .await
            .unwrap();
        (store, employee)
    }

    async fn submit_overtime_on(store: &InMemoryRepository, employee_id: u64, day: NaiveDate) -> u64 {
        store
            .submit_overtime(
                NewOvertime {
                    employee_id,
                    date: day,
                    hours: Decimal::new(2, 0),
                },
                Utc::now(),
            )
            .await
            .unwrap()
            .id
    }

    async fn submit_reimbursement_at(
        store: &InMemoryRepository,
        employee_id: u64,
        created_at: DateTime<Utc>,
    ) -> u64 {
        store
            .submit_reimbursement(
                NewReimbursement {
                    employee_id,
                    amount: Decimal::new(50_000, 0),
                    description: "Taxi".to_string(),
                },
                created_at,
            )
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_ids_are_sequential_per_table() {
        let (store, employee) = store_with_employee().await;
        assert_eq!(employee.id, 1);

        let first = submit_overtime_on(&store, employee.id, date(2025, 6, 2)).await;
        let second = submit_overtime_on(&store, employee.id, date(2025, 6, 3)).await;
        let reimbursement =
            submit_reimbursement_at(&store, employee.id, Utc::now()).await;

        assert_eq!((first, second, reimbursement), (1, 2, 1));
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let (store, _) = store_with_employee().await;
        let result = store
            .create_employee(NewEmployee {
                username: "employee1".to_string(),
                salary: Decimal::ONE,
            })
            .await;
        assert!(matches!(result, Err(EngineError::InvalidSubmission { .. })));
    }

    #[tokio::test]
    async fn test_attendance_unique_per_day() {
        let (store, employee) = store_with_employee().await;
        let morning = Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2025, 6, 2, 19, 0, 0).unwrap();

        store.record_attendance(employee.id, morning).await.unwrap();
        match store.record_attendance(employee.id, evening).await {
            Err(EngineError::DuplicateAttendance { date: d, .. }) => {
                assert_eq!(d, date(2025, 6, 2));
            }
            other => panic!("Expected DuplicateAttendance, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_attendance_requires_known_employee() {
        let store = InMemoryRepository::new();
        let result = store.record_attendance(99, Utc::now()).await;
        assert!(matches!(
            result,
            Err(EngineError::EmployeeNotFound { employee_id: 99 })
        ));
    }

    #[tokio::test]
    async fn test_count_attendance_uses_half_open_window() {
        let (store, employee) = store_with_employee().await;
        for (m, d, h) in [(5, 31, 23), (6, 1, 0), (6, 30, 23), (7, 1, 0)] {
            store
                .record_attendance(employee.id, Utc.with_ymd_and_hms(2025, m, d, h, 0, 0).unwrap())
                .await
                .unwrap();
        }

        let count = store
            .count_attendance_in_range(employee.id, june_2025())
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_overtime_selection_keys_on_date() {
        let (store, employee) = store_with_employee().await;
        let inside = submit_overtime_on(&store, employee.id, date(2025, 6, 30)).await;
        submit_overtime_on(&store, employee.id, date(2025, 7, 1)).await;

        let selected = store
            .list_unconsumed_overtime_in_range(employee.id, june_2025())
            .await
            .unwrap();
        let ids: Vec<u64> = selected.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![inside]);
    }

    #[tokio::test]
    async fn test_reimbursement_selection_keys_on_creation_time() {
        let (store, employee) = store_with_employee().await;
        let inside = submit_reimbursement_at(
            &store,
            employee.id,
            Utc.with_ymd_and_hms(2025, 6, 30, 22, 0, 0).unwrap(),
        )
        .await;
        submit_reimbursement_at(
            &store,
            employee.id,
            Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap(),
        )
        .await;

        let selected = store
            .list_unconsumed_reimbursements_in_range(employee.id, june_2025())
            .await
            .unwrap();
        let ids: Vec<u64> = selected.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![inside]);
    }

    #[tokio::test]
    async fn test_mark_consumed_stamps_all_entries() {
        let (store, employee) = store_with_employee().await;
        let overtime = submit_overtime_on(&store, employee.id, date(2025, 6, 5)).await;
        let reimbursement = submit_reimbursement_at(
            &store,
            employee.id,
            Utc.with_ymd_and_hms(2025, 6, 5, 9, 0, 0).unwrap(),
        )
        .await;

        store
            .mark_consumed(&ConsumptionBatch {
                period_id: 1,
                overtime_ids: vec![overtime],
                reimbursement_ids: vec![reimbursement],
            })
            .await
            .unwrap();

        assert_eq!(store.overtime_entry(overtime).await.unwrap().consumed_by, Some(1));
        assert_eq!(
            store.reimbursement_entry(reimbursement).await.unwrap().consumed_by,
            Some(1)
        );
        assert!(store
            .list_unconsumed_overtime_in_range(employee.id, june_2025())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_mark_consumed_is_all_or_nothing() {
        let (store, employee) = store_with_employee().await;
        let fresh = submit_overtime_on(&store, employee.id, date(2025, 6, 5)).await;
        let taken = submit_reimbursement_at(&store, employee.id, Utc::now()).await;

        store
            .mark_consumed(&ConsumptionBatch {
                period_id: 1,
                overtime_ids: vec![],
                reimbursement_ids: vec![taken],
            })
            .await
            .unwrap();

        let result = store
            .mark_consumed(&ConsumptionBatch {
                period_id: 2,
                overtime_ids: vec![fresh],
                reimbursement_ids: vec![taken],
            })
            .await;

        match result {
            Err(EngineError::EntryAlreadyConsumed {
                kind,
                entry_id,
                consumed_by,
            }) => {
                assert_eq!(kind, LedgerKind::Reimbursement);
                assert_eq!(entry_id, taken);
                assert_eq!(consumed_by, 1);
            }
            other => panic!("Expected EntryAlreadyConsumed, got {:?}", other),
        }

        // the fresh overtime entry was not partially marked
        assert_eq!(store.overtime_entry(fresh).await.unwrap().consumed_by, None);
        assert_eq!(
            store.reimbursement_entry(taken).await.unwrap().consumed_by,
            Some(1)
        );
    }

    #[tokio::test]
    async fn test_mark_consumed_unknown_entry() {
        let store = InMemoryRepository::new();
        let result = store
            .mark_consumed(&ConsumptionBatch {
                period_id: 1,
                overtime_ids: vec![404],
                reimbursement_ids: vec![],
            })
            .await;
        assert!(matches!(
            result,
            Err(EngineError::EntryNotFound {
                kind: LedgerKind::Overtime,
                entry_id: 404
            })
        ));
    }

    #[tokio::test]
    async fn test_claim_period_only_once() {
        let store = InMemoryRepository::new();
        let period = store
            .create_period(
                NewPayrollPeriod {
                    start_date: date(2025, 6, 1),
                    end_date: date(2025, 6, 30),
                    created_by: 1,
                },
                Utc::now(),
            )
            .await
            .unwrap();

        store.claim_period(period.id).await.unwrap();
        assert!(store.fetch_period(period.id).await.unwrap().unwrap().is_run);
        assert!(matches!(
            store.claim_period(period.id).await,
            Err(EngineError::PeriodAlreadyRun { .. })
        ));
        assert!(matches!(
            store.claim_period(77).await,
            Err(EngineError::PeriodNotFound { period_id: 77 })
        ));
    }

    #[tokio::test]
    async fn test_create_period_rejects_reversed_dates() {
        let store = InMemoryRepository::new();
        let result = store
            .create_period(
                NewPayrollPeriod {
                    start_date: date(2025, 6, 30),
                    end_date: date(2025, 6, 1),
                    created_by: 1,
                },
                Utc::now(),
            )
            .await;
        assert!(matches!(result, Err(EngineError::InvalidPeriod { .. })));
    }

    #[tokio::test]
    async fn test_audit_records_listed_newest_first() {
        let store = InMemoryRepository::new();
        store
            .append_audit(AuditEntry::new(1, ActorType::Admin, "FIRST", "", "unknown"))
            .await
            .unwrap();
        store
            .append_audit(AuditEntry::new(1, ActorType::Admin, "SECOND", "", "unknown"))
            .await
            .unwrap();

        let records = store.list_audit_records().await.unwrap();
        let actions: Vec<&str> = records.iter().map(|r| r.action.as_str()).collect();
        assert_eq!(actions, vec!["SECOND", "FIRST"]);
    }
}
