//! Audit sink used by the payroll runner and the HTTP layer.
//!
//! Recording an audit event never fails the caller: a sink that cannot
//! persist an entry logs the failure and moves on.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::models::AuditEntry;
use crate::repository::RecordStore;

/// Fire-and-forget destination for audit events.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Records one audit event.
    async fn record(&self, entry: AuditEntry);
}

/// An [`AuditSink`] that appends to a [`RecordStore`].
#[derive(Clone)]
pub struct StoreAuditSink {
    store: Arc<dyn RecordStore>,
}

impl StoreAuditSink {
    /// Creates a sink writing to the given store.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuditSink for StoreAuditSink {
    async fn record(&self, entry: AuditEntry) {
        let action = entry.action.clone();
        match self.store.append_audit(entry).await {
            Ok(record) => debug!(audit_id = record.id, action = %record.action, "Audit recorded"),
            Err(e) => warn!(action = %action, error = %e, "Failed to record audit entry"),
        }
    }
}
