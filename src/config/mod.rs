//! Configuration loading and management for the Payslip Engine.
//!
//! This module provides functionality to load engine configuration from YAML
//! files: earnings rules, submission rules, server and logging settings.
//!
//! # Example
//!
//! ```no_run
//! use payslip_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config").unwrap();
//! println!("Overtime multiplier: {}", config.payroll_rules().overtime_multiplier());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    EngineConfig, LoggingConfig, PayrollFile, PayrollRules, ServerConfig, ServerFile,
    SubmissionRules,
};
