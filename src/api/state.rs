//! Application state for the Payslip Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use crate::audit::{AuditSink, StoreAuditSink};
use crate::clock::{Clock, SystemClock};
use crate::config::ConfigLoader;
use crate::payroll::{PayrollRunner, RunTrigger};
use crate::repository::{PayrollRepository, RecordStore};

/// Shared application state.
///
/// Contains resources that are shared across all request handlers: the
/// record store, the payroll run queue, the audit sink, the loaded
/// configuration and the clock.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn RecordStore>,
    trigger: RunTrigger,
    audit: Arc<dyn AuditSink>,
    config: Arc<ConfigLoader>,
    clock: Arc<dyn Clock>,
}

impl AppState {
    /// Builds the state around a store and spawns the payroll run worker,
    /// reading time from the system clock.
    ///
    /// Must be called from within a tokio runtime. The returned handle
    /// finishes once every clone of the state has been dropped.
    pub fn spawn<S>(store: Arc<S>, config: ConfigLoader) -> (Self, JoinHandle<()>)
    where
        S: PayrollRepository + RecordStore + 'static,
    {
        Self::spawn_with_clock(store, config, Arc::new(SystemClock))
    }

    /// Like [`AppState::spawn`], but submissions and payroll runs read time
    /// from `clock`.
    pub fn spawn_with_clock<S>(
        store: Arc<S>,
        config: ConfigLoader,
        clock: Arc<dyn Clock>,
    ) -> (Self, JoinHandle<()>)
    where
        S: PayrollRepository + RecordStore + 'static,
    {
        let records: Arc<dyn RecordStore> = store.clone();
        let audit: Arc<dyn AuditSink> = Arc::new(StoreAuditSink::new(records.clone()));
        let runner = PayrollRunner::new(store, audit.clone(), config.payroll_rules())
            .with_clock(clock.clone());
        let (trigger, worker) = RunTrigger::spawn(runner);

        let state = Self {
            store: records,
            trigger,
            audit,
            config: Arc::new(config),
            clock,
        };
        (state, worker)
    }

    /// Returns the record store.
    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Returns the payroll run queue.
    pub fn trigger(&self) -> &RunTrigger {
        &self.trigger
    }

    /// Returns the audit sink.
    pub fn audit(&self) -> &dyn AuditSink {
        self.audit.as_ref()
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the current time according to the state's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::repository::InMemoryRepository;
    use chrono::TimeZone;

    #[test]
    fn test_app_state_is_clone() {
        // axum state must be Clone
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[tokio::test]
    async fn test_spawn_with_clock_overrides_now() {
        let fixed = Utc.with_ymd_and_hms(2025, 6, 4, 18, 0, 0).unwrap();
        let (state, _worker) = AppState::spawn_with_clock(
            Arc::new(InMemoryRepository::new()),
            ConfigLoader::default(),
            Arc::new(FixedClock(fixed)),
        );
        assert_eq!(state.now(), fixed);
    }
}
