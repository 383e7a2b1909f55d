//! Employee model.
//!
//! An employee is paid a period-independent base salary which the earnings
//! calculation prorates by attendance.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents an employee on the payroll.
///
/// # Example
///
/// ```
/// use payslip_engine::models::Employee;
/// use rust_decimal::Decimal;
///
/// let employee = Employee {
///     id: 1,
///     username: "employee1".to_string(),
///     salary: Decimal::new(10_500_000, 0),
/// };
/// assert_eq!(employee.salary, Decimal::new(10_500_000, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: u64,
    /// Login name, unique across employees.
    pub username: String,
    /// Base salary for a full payroll period.
    pub salary: Decimal,
}

/// Fields required to register an employee; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    /// Login name, unique across employees.
    pub username: String,
    /// Base salary for a full payroll period.
    pub salary: Decimal,
}

impl NewEmployee {
    /// Attaches a store-assigned id.
    pub fn into_employee(self, id: u64) -> Employee {
        Employee {
            id,
            username: self.username,
            salary: self.salary,
        }
    }
}
