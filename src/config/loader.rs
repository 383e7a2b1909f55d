//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configuration from YAML files.

use rust_decimal::Decimal;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{
    EngineConfig, LoggingConfig, PayrollFile, PayrollRules, ServerConfig, ServerFile,
    SubmissionRules,
};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/
/// ├── payroll.yaml   # Earnings and submission rules
/// └── server.yaml    # Listen address and logging
/// ```
///
/// # Example
///
/// ```no_run
/// use payslip_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config").unwrap();
/// println!("Listening on {}", loader.server().bind_address);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if either file is missing or contains invalid YAML,
    /// or if a value is out of range.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let payroll_file = Self::load_yaml::<PayrollFile>(&path.join("payroll.yaml"))?;
        let server_file = Self::load_yaml::<ServerFile>(&path.join("server.yaml"))?;

        Self::validate_submissions(&payroll_file.submissions)?;

        Ok(Self {
            config: EngineConfig {
                payroll: payroll_file.payroll,
                submissions: payroll_file.submissions,
                server: server_file.server,
                logging: server_file.logging,
            },
        })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn validate_submissions(rules: &SubmissionRules) -> EngineResult<()> {
        if rules.max_overtime_hours <= Decimal::ZERO {
            return Err(EngineError::InvalidConfig {
                field: "submissions.max_overtime_hours".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if rules.max_reimbursement_amount <= Decimal::ZERO {
            return Err(EngineError::InvalidConfig {
                field: "submissions.max_reimbursement_amount".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if rules.overtime_opens_at_hour > 23 {
            return Err(EngineError::InvalidConfig {
                field: "submissions.overtime_opens_at_hour".to_string(),
                message: format!("{} is not an hour of the day", rules.overtime_opens_at_hour),
            });
        }
        Ok(())
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the earnings rules.
    pub fn payroll_rules(&self) -> PayrollRules {
        self.config.payroll
    }

    /// Returns the submission rules.
    pub fn submission_rules(&self) -> &SubmissionRules {
        &self.config.submissions
    }

    /// Returns the server settings.
    pub fn server(&self) -> &ServerConfig {
        &self.config.server
    }

    /// Returns the logging settings.
    pub fn logging(&self) -> &LoggingConfig {
        &self.config.logging
    }
}
