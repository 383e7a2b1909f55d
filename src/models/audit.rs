//! Audit log models.
//!
//! Audit records are append-only. The payroll orchestrator writes one per
//! run; the HTTP layer writes one per period created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Action tag for a completed payroll run.
pub const ACTION_RAN_PAYROLL: &str = "RAN_PAYROLL";

/// Action tag for a newly created payroll period.
pub const ACTION_CREATED_PERIOD: &str = "CREATED_PERIOD";

/// Who performed an audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorType {
    /// An administrator.
    Admin,
    /// An employee.
    Employee,
}

impl std::fmt::Display for ActorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActorType::Admin => write!(f, "admin"),
            ActorType::Employee => write!(f, "employee"),
        }
    }
}

/// An audit event waiting to be recorded.
///
/// # Example
///
/// ```
/// use payslip_engine::models::{ActorType, AuditEntry, ACTION_RAN_PAYROLL};
///
/// let entry = AuditEntry::new(
///     1,
///     ActorType::Admin,
///     ACTION_RAN_PAYROLL,
///     "Successfully ran payroll for period ID 4.",
///     "10.0.0.8",
/// );
/// assert_eq!(entry.action, "RAN_PAYROLL");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Id of the acting admin or employee.
    pub actor_id: u64,
    /// Whether the actor is an admin or an employee.
    pub actor_type: ActorType,
    /// Action tag, e.g. `RAN_PAYROLL`.
    pub action: String,
    /// Free-text detail.
    pub detail: String,
    /// Address the action originated from.
    pub origin: String,
}

impl AuditEntry {
    /// Creates an entry.
    pub fn new(
        actor_id: u64,
        actor_type: ActorType,
        action: impl Into<String>,
        detail: impl Into<String>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            actor_id,
            actor_type,
            action: action.into(),
            detail: detail.into(),
            origin: origin.into(),
        }
    }

    /// Attaches a store-assigned id and timestamp.
    pub fn into_record(self, id: u64, recorded_at: DateTime<Utc>) -> AuditRecord {
        AuditRecord {
            id,
            actor_id: self.actor_id,
            actor_type: self.actor_type,
            action: self.action,
            detail: self.detail,
            origin: self.origin,
            recorded_at,
        }
    }
}

/// A persisted audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// Unique identifier.
    pub id: u64,
    /// Id of the acting admin or employee.
    pub actor_id: u64,
    /// Whether the actor is an admin or an employee.
    pub actor_type: ActorType,
    /// Action tag.
    pub action: String,
    /// Free-text detail.
    pub detail: String,
    /// Address the action originated from.
    pub origin: String,
    /// When the record was written.
    pub recorded_at: DateTime<Utc>,
}
