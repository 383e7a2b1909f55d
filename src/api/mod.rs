//! HTTP API module for the Payslip Engine.
//!
//! This module provides the REST endpoints administrators use to define and
//! run payroll periods, and employees use to submit attendance, overtime and
//! reimbursements and to read their payslips.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::{REQUEST_ID_HEADER, create_router, request_origin};
pub use request::{
    AttendanceRequest, CreatePeriodRequest, OvertimeRequest, PayslipQuery, PeriodQuery,
    ReimbursementRequest, RunPayrollRequest,
};
pub use response::{ApiError, ApiErrorResponse};
pub use crate::clock::{Clock, FixedClock, SystemClock};
pub use state::AppState;
