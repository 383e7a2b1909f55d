//! Payroll run orchestration.
//!
//! A run guards the period, claims it, then prices every employee in turn.
//! One employee's failure is logged and skipped; it never aborts the run.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::audit::AuditSink;
use crate::calculation::{
    EarningsInput, calculate_payslip, consume_ledger, count_attendance, count_working_days,
    select_unconsumed,
};
use crate::clock::{Clock, SystemClock};
use crate::config::PayrollRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{ACTION_RAN_PAYROLL, ActorType, AuditEntry, Employee, PayrollPeriod};
use crate::repository::PayrollRepository;

/// A request to run payroll for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    /// The period to run.
    pub period_id: u64,
    /// The administrator running payroll.
    pub actor_id: u64,
    /// Address the request came from.
    pub origin: String,
}

/// Counts reported by a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Payslips written.
    pub payslips_created: usize,
    /// Employees skipped because their payslip could not be produced.
    pub employees_skipped: usize,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The period does not exist.
    AbortedNotFound,
    /// The period was already run, or another run claimed it first.
    AbortedAlreadyRun,
    /// The store failed while checking or claiming the period.
    GuardFailed {
        /// The store error.
        message: String,
    },
    /// Every employee was processed.
    Completed(RunSummary),
}

/// Runs payroll for a period against a repository.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use payslip_engine::audit::StoreAuditSink;
/// use payslip_engine::config::PayrollRules;
/// use payslip_engine::payroll::{PayrollRunner, RunOutcome, RunRequest};
/// use payslip_engine::repository::InMemoryRepository;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let store = Arc::new(InMemoryRepository::new());
/// let runner = PayrollRunner::new(
///     store.clone(),
///     Arc::new(StoreAuditSink::new(store)),
///     PayrollRules::default(),
/// );
///
/// let outcome = runner
///     .run(RunRequest { period_id: 1, actor_id: 1, origin: "unknown".to_string() })
///     .await;
/// assert_eq!(outcome, RunOutcome::AbortedNotFound);
/// # });
/// ```
#[derive(Clone)]
pub struct PayrollRunner {
    repo: Arc<dyn PayrollRepository>,
    audit: Arc<dyn AuditSink>,
    rules: PayrollRules,
    clock: Arc<dyn Clock>,
}

impl PayrollRunner {
    /// Creates a runner that stamps payslips with the system time.
    pub fn new(
        repo: Arc<dyn PayrollRepository>,
        audit: Arc<dyn AuditSink>,
        rules: PayrollRules,
    ) -> Self {
        Self {
            repo,
            audit,
            rules,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock used for payslip timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Runs payroll for the requested period to completion.
    pub async fn run(&self, request: RunRequest) -> RunOutcome {
        let period_id = request.period_id;
        info!(period_id, actor_id = request.actor_id, "Payroll run started");

        let period = match self.guard(period_id).await {
            Ok(period) => period,
            Err(outcome) => return outcome,
        };

        let employees = match self.repo.fetch_all_employees().await {
            Ok(employees) => employees,
            Err(e) => {
                // the period stays claimed; nothing was written for it
                warn!(period_id, error = %e, "Failed to list employees");
                return RunOutcome::GuardFailed {
                    message: e.to_string(),
                };
            }
        };

        let working_days = count_working_days(period.start_date, period.end_date);
        let mut summary = RunSummary::default();

        for employee in &employees {
            match self
                .process_employee(&period, employee, working_days, &request)
                .await
            {
                Ok(()) => summary.payslips_created += 1,
                Err(e) => {
                    warn!(
                        period_id,
                        employee_id = employee.id,
                        error = %e,
                        "Skipping employee"
                    );
                    summary.employees_skipped += 1;
                }
            }
        }

        self.audit
            .record(AuditEntry::new(
                request.actor_id,
                ActorType::Admin,
                ACTION_RAN_PAYROLL,
                format!("Successfully ran payroll for period ID {}.", period_id),
                request.origin.as_str(),
            ))
            .await;

        info!(
            period_id,
            payslips_created = summary.payslips_created,
            employees_skipped = summary.employees_skipped,
            "Payroll run completed"
        );
        RunOutcome::Completed(summary)
    }

    /// Checks the period exists and is unrun, then claims it.
    async fn guard(&self, period_id: u64) -> Result<PayrollPeriod, RunOutcome> {
        let period = match self.repo.fetch_period(period_id).await {
            Ok(Some(period)) => period,
            Ok(None) => {
                warn!(period_id, "Payroll period not found, run aborted");
                return Err(RunOutcome::AbortedNotFound);
            }
            Err(e) => {
                warn!(period_id, error = %e, "Failed to fetch payroll period");
                return Err(RunOutcome::GuardFailed {
                    message: e.to_string(),
                });
            }
        };

        if period.is_run {
            warn!(period_id, "Payroll period already run, run aborted");
            return Err(RunOutcome::AbortedAlreadyRun);
        }

        match self.repo.claim_period(period_id).await {
            Ok(()) => Ok(period),
            Err(EngineError::PeriodAlreadyRun { .. }) => {
                warn!(period_id, "Payroll period claimed by another run, run aborted");
                Err(RunOutcome::AbortedAlreadyRun)
            }
            Err(EngineError::PeriodNotFound { .. }) => Err(RunOutcome::AbortedNotFound),
            Err(e) => {
                warn!(period_id, error = %e, "Failed to claim payroll period");
                Err(RunOutcome::GuardFailed {
                    message: e.to_string(),
                })
            }
        }
    }

    async fn process_employee(
        &self,
        period: &PayrollPeriod,
        employee: &Employee,
        working_days: u32,
        request: &RunRequest,
    ) -> EngineResult<()> {
        let repo = self.repo.as_ref();
        let range = period.range();

        let days_attended = count_attendance(repo, employee.id, range).await?;
        let selection = select_unconsumed(repo, employee.id, range).await?;

        let payslip = calculate_payslip(
            &EarningsInput {
                employee,
                period_id: period.id,
                working_days,
                days_attended,
                selection: &selection,
                generated_by: request.actor_id,
                request_origin: &request.origin,
                generated_at: self.clock.now(),
            },
            &self.rules,
        )?;

        let receipt = consume_ledger(repo, &selection, period.id).await?;
        let take_home_pay = payslip.take_home_pay;

        if let Err(e) = repo.create_payslip(payslip).await {
            // entries stay consumed by this period without a payslip
            warn!(
                period_id = period.id,
                employee_id = employee.id,
                consumed = receipt.len(),
                "Payslip not written after ledger consumption"
            );
            return Err(e);
        }

        info!(
            period_id = period.id,
            employee_id = employee.id,
            %take_home_pay,
            "Payslip created"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::StoreAuditSink;
    use crate::clock::FixedClock;
    use crate::models::{
        DateRange, NewEmployee, NewOvertime, NewPayrollPeriod, NewReimbursement, OvertimeEntry,
        Payslip, ReimbursementEntry,
    };
    use crate::repository::{ConsumptionBatch, InMemoryRepository, RecordStore};
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(period_id: u64) -> RunRequest {
        RunRequest {
            period_id,
            actor_id: 1,
            origin: "10.0.0.1".to_string(),
        }
    }

    fn runner_for(store: Arc<InMemoryRepository>) -> PayrollRunner {
        PayrollRunner::new(
            store.clone(),
            Arc::new(StoreAuditSink::new(store)),
            PayrollRules::default(),
        )
    }

    async fn create_period(store: &InMemoryRepository, start: NaiveDate, end: NaiveDate) -> u64 {
        store
            .create_period(
                NewPayrollPeriod {
                    start_date: start,
                    end_date: end,
                    created_by: 1,
                },
                Utc::now(),
            )
            .await
            .unwrap()
            .id
    }

    async fn create_employee(store: &InMemoryRepository, username: &str, salary: &str) -> u64 {
        store
            .create_employee(NewEmployee {
                username: username.to_string(),
                salary: dec(salary),
            })
            .await
            .unwrap()
            .id
    }

    /// Records check-ins on the first `days` weekdays of June 2025.
    async fn attend_june(store: &InMemoryRepository, employee_id: u64, days: usize) {
        let weekdays = DateRange::new(date(2025, 6, 1), date(2025, 6, 30))
            .days()
            .filter(|d| crate::calculation::is_working_day(*d))
            .take(days)
            .collect::<Vec<_>>();
        for day in weekdays {
            let at = day.and_hms_opt(8, 0, 0).unwrap().and_utc();
            store.record_attendance(employee_id, at).await.unwrap();
        }
    }

    async fn submit_extras(store: &InMemoryRepository, employee_id: u64) {
        store
            .submit_overtime(
                NewOvertime {
                    employee_id,
                    date: date(2025, 6, 18),
                    hours: dec("3"),
                },
                Utc.with_ymd_and_hms(2025, 6, 18, 18, 0, 0).unwrap(),
            )
            .await
            .unwrap();
        store
            .submit_reimbursement(
                NewReimbursement {
                    employee_id,
                    amount: dec("50000"),
                    description: "Taxi".to_string(),
                },
                Utc.with_ymd_and_hms(2025, 6, 19, 10, 0, 0).unwrap(),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_run_creates_payslips_and_audits() {
        let store = Arc::new(InMemoryRepository::new());
        let full = create_employee(&store, "employee1", "10500000").await;
        let partial = create_employee(&store, "employee2", "10500000").await;
        attend_june(&store, full, 21).await;
        attend_june(&store, partial, 15).await;
        submit_extras(&store, partial).await;
        let period_id = create_period(&store, date(2025, 6, 1), date(2025, 6, 30)).await;

        let outcome = runner_for(store.clone()).run(request(period_id)).await;
        assert_eq!(
            outcome,
            RunOutcome::Completed(RunSummary {
                payslips_created: 2,
                employees_skipped: 0
            })
        );

        let first = store.find_payslip(full, period_id).await.unwrap().unwrap();
        assert_eq!(first.working_days, 21);
        assert_eq!(first.take_home_pay, dec("10500000"));

        let second = store.find_payslip(partial, period_id).await.unwrap().unwrap();
        assert_eq!(second.prorated_salary, dec("7500000"));
        assert_eq!(second.overtime_pay, dec("375000"));
        assert_eq!(second.take_home_pay, dec("7925000"));
        assert_eq!(second.request_origin, "10.0.0.1");

        assert!(store.fetch_period(period_id).await.unwrap().unwrap().is_run);
        assert_eq!(store.overtime_entry(1).await.unwrap().consumed_by, Some(period_id));

        let audit = store.list_audit_records().await.unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].action, ACTION_RAN_PAYROLL);
        assert_eq!(audit[0].actor_type, ActorType::Admin);
        assert_eq!(
            audit[0].detail,
            format!("Successfully ran payroll for period ID {}.", period_id)
        );
    }

    #[tokio::test]
    async fn test_zero_employees_still_audits() {
        let store = Arc::new(InMemoryRepository::new());
        let period_id = create_period(&store, date(2025, 6, 1), date(2025, 6, 30)).await;

        let outcome = runner_for(store.clone()).run(request(period_id)).await;

        assert_eq!(outcome, RunOutcome::Completed(RunSummary::default()));
        assert_eq!(store.payslip_count().await, 0);
        assert_eq!(store.list_audit_records().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_period_aborts() {
        let store = Arc::new(InMemoryRepository::new());
        create_employee(&store, "employee1", "5000000").await;

        let outcome = runner_for(store.clone()).run(request(42)).await;

        assert_eq!(outcome, RunOutcome::AbortedNotFound);
        assert_eq!(store.payslip_count().await, 0);
        assert!(store.list_audit_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_run_is_a_no_op() {
        let store = Arc::new(InMemoryRepository::new());
        let employee_id = create_employee(&store, "employee1", "10500000").await;
        attend_june(&store, employee_id, 10).await;
        let period_id = create_period(&store, date(2025, 6, 1), date(2025, 6, 30)).await;
        let runner = runner_for(store.clone());

        runner.run(request(period_id)).await;
        // late submission after the first run
        submit_extras(&store, employee_id).await;
        let outcome = runner.run(request(period_id)).await;

        assert_eq!(outcome, RunOutcome::AbortedAlreadyRun);
        assert_eq!(store.payslip_count().await, 1);
        assert_eq!(store.overtime_entry(1).await.unwrap().consumed_by, None);
        assert_eq!(store.reimbursement_entry(1).await.unwrap().consumed_by, None);
        assert_eq!(store.list_audit_records().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_later_period_excludes_consumed_entries() {
        let store = Arc::new(InMemoryRepository::new());
        let employee_id = create_employee(&store, "employee1", "10500000").await;
        submit_extras(&store, employee_id).await;
        let june = create_period(&store, date(2025, 6, 1), date(2025, 6, 30)).await;
        let overlapping = create_period(&store, date(2025, 6, 15), date(2025, 7, 15)).await;
        let runner = runner_for(store.clone());

        runner.run(request(june)).await;
        runner.run(request(overlapping)).await;

        let first = store.find_payslip(employee_id, june).await.unwrap().unwrap();
        let second = store
            .find_payslip(employee_id, overlapping)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.overtime_hours, dec("3"));
        assert_eq!(first.reimbursement, dec("50000"));
        assert_eq!(second.overtime_hours, Decimal::ZERO);
        assert_eq!(second.reimbursement, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_overflowing_reimbursements_skip_only_that_employee() {
        let store = Arc::new(InMemoryRepository::new());
        let claimant = create_employee(&store, "employee1", "10500000").await;
        let colleague = create_employee(&store, "employee2", "10500000").await;
        attend_june(&store, colleague, 21).await;
        for amount in [Decimal::MAX, Decimal::ONE] {
            store
                .submit_reimbursement(
                    NewReimbursement {
                        employee_id: claimant,
                        amount,
                        description: "Relocation".to_string(),
                    },
                    Utc.with_ymd_and_hms(2025, 6, 10, 10, 0, 0).unwrap(),
                )
                .await
                .unwrap();
        }
        let period_id = create_period(&store, date(2025, 6, 1), date(2025, 6, 30)).await;

        let outcome = runner_for(store.clone()).run(request(period_id)).await;

        assert_eq!(
            outcome,
            RunOutcome::Completed(RunSummary {
                payslips_created: 1,
                employees_skipped: 1
            })
        );
        assert!(store.find_payslip(claimant, period_id).await.unwrap().is_none());
        let paid = store.find_payslip(colleague, period_id).await.unwrap().unwrap();
        assert_eq!(paid.take_home_pay, dec("10500000"));
        // nothing was consumed for the skipped employee
        assert_eq!(store.reimbursement_entry(1).await.unwrap().consumed_by, None);
        assert_eq!(store.reimbursement_entry(2).await.unwrap().consumed_by, None);
        assert_eq!(store.list_audit_records().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_payslips_are_stamped_by_the_runner_clock() {
        let store = Arc::new(InMemoryRepository::new());
        let employee_id = create_employee(&store, "employee1", "5000000").await;
        let period_id = create_period(&store, date(2025, 6, 1), date(2025, 6, 30)).await;
        let stamped = Utc.with_ymd_and_hms(2025, 7, 1, 9, 30, 0).unwrap();

        runner_for(store.clone())
            .with_clock(Arc::new(FixedClock(stamped)))
            .run(request(period_id))
            .await;

        let payslip = store.find_payslip(employee_id, period_id).await.unwrap().unwrap();
        assert_eq!(payslip.generated_at, stamped);
    }

    /// Delegates to an in-memory store but refuses to consume one employee's entries.
    struct RejectingRepository {
        inner: Arc<InMemoryRepository>,
        reject_for: u64,
    }

    #[async_trait]
    impl PayrollRepository for RejectingRepository {
        async fn fetch_period(&self, period_id: u64) -> EngineResult<Option<PayrollPeriod>> {
            self.inner.fetch_period(period_id).await
        }

        async fn fetch_all_employees(&self) -> EngineResult<Vec<Employee>> {
            self.inner.fetch_all_employees().await
        }

        async fn count_attendance_in_range(
            &self,
            employee_id: u64,
            range: DateRange,
        ) -> EngineResult<u32> {
            self.inner.count_attendance_in_range(employee_id, range).await
        }

        async fn list_unconsumed_overtime_in_range(
            &self,
            employee_id: u64,
            range: DateRange,
        ) -> EngineResult<Vec<OvertimeEntry>> {
            self.inner
                .list_unconsumed_overtime_in_range(employee_id, range)
                .await
        }

        async fn list_unconsumed_reimbursements_in_range(
            &self,
            employee_id: u64,
            range: DateRange,
        ) -> EngineResult<Vec<ReimbursementEntry>> {
            self.inner
                .list_unconsumed_reimbursements_in_range(employee_id, range)
                .await
        }

        async fn mark_consumed(&self, batch: &ConsumptionBatch) -> EngineResult<()> {
            let rejected = self
                .inner
                .overtime_entry(batch.overtime_ids.first().copied().unwrap_or_default())
                .await
                .is_some_and(|entry| entry.employee_id == self.reject_for);
            if rejected {
                return Err(EngineError::StoreError {
                    message: "write conflict".to_string(),
                });
            }
            self.inner.mark_consumed(batch).await
        }

        async fn create_payslip(&self, payslip: Payslip) -> EngineResult<()> {
            self.inner.create_payslip(payslip).await
        }

        async fn claim_period(&self, period_id: u64) -> EngineResult<()> {
            self.inner.claim_period(period_id).await
        }
    }

    #[tokio::test]
    async fn test_consumption_failure_skips_only_that_employee() {
        let store = Arc::new(InMemoryRepository::new());
        let unlucky = create_employee(&store, "employee1", "10500000").await;
        let fine = create_employee(&store, "employee2", "10500000").await;
        submit_extras(&store, unlucky).await;
        submit_extras(&store, fine).await;
        let period_id = create_period(&store, date(2025, 6, 1), date(2025, 6, 30)).await;

        let runner = PayrollRunner::new(
            Arc::new(RejectingRepository {
                inner: store.clone(),
                reject_for: unlucky,
            }),
            Arc::new(StoreAuditSink::new(store.clone())),
            PayrollRules::default(),
        );
        let outcome = runner.run(request(period_id)).await;

        assert_eq!(
            outcome,
            RunOutcome::Completed(RunSummary {
                payslips_created: 1,
                employees_skipped: 1
            })
        );
        assert!(store.find_payslip(unlucky, period_id).await.unwrap().is_none());
        assert!(store.find_payslip(fine, period_id).await.unwrap().is_some());
        // the skipped employee's entries stay available for a later run
        assert_eq!(store.overtime_entry(1).await.unwrap().consumed_by, None);
        assert_eq!(store.list_audit_records().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_runs_claim_once() {
        let store = Arc::new(InMemoryRepository::new());
        let employee_id = create_employee(&store, "employee1", "10500000").await;
        submit_extras(&store, employee_id).await;
        let period_id = create_period(&store, date(2025, 6, 1), date(2025, 6, 30)).await;
        let runner = runner_for(store.clone());

        let (a, b) = tokio::join!(runner.run(request(period_id)), runner.run(request(period_id)));

        let completed = [&a, &b]
            .iter()
            .filter(|o| matches!(o, RunOutcome::Completed(_)))
            .count();
        assert_eq!(completed, 1);
        assert!([&a, &b].contains(&&RunOutcome::AbortedAlreadyRun));
        assert_eq!(store.payslip_count().await, 1);
    }
}
