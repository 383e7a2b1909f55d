//! Configuration types for the Payslip Engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

fn default_standard_hours_per_day() -> Decimal {
    Decimal::new(8, 0)
}

fn default_overtime_multiplier() -> Decimal {
    Decimal::new(2, 0)
}

/// Rates used to turn a daily rate into overtime pay.
///
/// Construct with [`PayrollRules::new`] or deserialize; both reject a
/// non-positive standard day and a negative multiplier, so the earnings
/// calculation can divide without checking.
///
/// # Example
///
/// ```
/// use payslip_engine::config::PayrollRules;
/// use rust_decimal::Decimal;
///
/// let rules = PayrollRules::default();
/// assert_eq!(rules.standard_hours_per_day(), Decimal::new(8, 0));
/// assert_eq!(rules.overtime_multiplier(), Decimal::new(2, 0));
///
/// assert!(PayrollRules::new(Decimal::ZERO, Decimal::new(2, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPayrollRules")]
pub struct PayrollRules {
    standard_hours_per_day: Decimal,
    overtime_multiplier: Decimal,
}

impl PayrollRules {
    /// Creates validated payroll rules.
    pub fn new(
        standard_hours_per_day: Decimal,
        overtime_multiplier: Decimal,
    ) -> Result<Self, EngineError> {
        if standard_hours_per_day <= Decimal::ZERO {
            return Err(EngineError::InvalidConfig {
                field: "payroll.standard_hours_per_day".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if overtime_multiplier < Decimal::ZERO {
            return Err(EngineError::InvalidConfig {
                field: "payroll.overtime_multiplier".to_string(),
                message: "must not be negative".to_string(),
            });
        }
        Ok(Self {
            standard_hours_per_day,
            overtime_multiplier,
        })
    }

    /// Hours in an ordinary working day; divides the daily rate into an hourly rate.
    pub fn standard_hours_per_day(&self) -> Decimal {
        self.standard_hours_per_day
    }

    /// Multiplier applied to the hourly rate for overtime hours.
    pub fn overtime_multiplier(&self) -> Decimal {
        self.overtime_multiplier
    }
}

impl Default for PayrollRules {
    fn default() -> Self {
        Self {
            standard_hours_per_day: default_standard_hours_per_day(),
            overtime_multiplier: default_overtime_multiplier(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPayrollRules {
    #[serde(default = "default_standard_hours_per_day")]
    standard_hours_per_day: Decimal,
    #[serde(default = "default_overtime_multiplier")]
    overtime_multiplier: Decimal,
}

impl TryFrom<RawPayrollRules> for PayrollRules {
    type Error = EngineError;

    fn try_from(raw: RawPayrollRules) -> Result<Self, Self::Error> {
        PayrollRules::new(raw.standard_hours_per_day, raw.overtime_multiplier)
    }
}

/// Rules applied when employees submit activity records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionRules {
    /// Largest overtime entry accepted, in hours.
    pub max_overtime_hours: Decimal,
    /// Hour of day (UTC) from which overtime may be proposed.
    pub overtime_opens_at_hour: u32,
    /// Whether attendance may be submitted on Saturdays and Sundays.
    pub allow_weekend_attendance: bool,
    /// Largest single reimbursement accepted.
    pub max_reimbursement_amount: Decimal,
}

impl Default for SubmissionRules {
    fn default() -> Self {
        Self {
            max_overtime_hours: Decimal::new(3, 0),
            overtime_opens_at_hour: 17,
            allow_weekend_attendance: false,
            max_reimbursement_amount: Decimal::new(100_000_000, 0),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive; `RUST_LOG` takes precedence.
    pub filter: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "payslip_engine=info,payslip_server=info".to_string(),
            json: false,
        }
    }
}

/// Contents of `payroll.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayrollFile {
    /// Earnings rules.
    #[serde(default)]
    pub payroll: PayrollRules,
    /// Submission rules.
    #[serde(default)]
    pub submissions: SubmissionRules,
}

/// Contents of `server.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerFile {
    /// Server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Earnings rules.
    pub payroll: PayrollRules,
    /// Submission rules.
    pub submissions: SubmissionRules,
    /// Server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}
