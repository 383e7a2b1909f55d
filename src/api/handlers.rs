//! HTTP request handlers for the Payslip Engine API.
//!
//! This module contains the handler functions for all API endpoints and the
//! request logging middleware.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Query, Request, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{
    ACTION_CREATED_PERIOD, ActorType, AuditEntry, NewEmployee, NewPayrollPeriod, PeriodPayout,
};
use crate::payroll::RunRequest;

use super::request::{
    AttendanceRequest, CreatePeriodRequest, OvertimeRequest, PayslipQuery, PeriodQuery,
    ReimbursementRequest, RunPayrollRequest,
};
use super::response::ApiErrorResponse;
use super::state::AppState;

type ApiResult<T> = Result<T, ApiErrorResponse>;

/// Employees created by `POST /seed`.
const SEED_EMPLOYEES: u32 = 100;

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/seed", post(seed_handler))
        .route("/admin/payroll-periods", post(create_period_handler))
        .route("/admin/run-payroll", post(run_payroll_handler))
        .route("/admin/payslips/summary", get(payslip_summary_handler))
        .route("/admin/audit-logs", get(audit_logs_handler))
        .route("/employee/attendance", post(attendance_handler))
        .route("/employee/overtime", post(overtime_handler))
        .route("/employee/reimbursements", post(reimbursement_handler))
        .route("/employee/payslip", get(payslip_handler))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

/// The caller's address: first `X-Forwarded-For` hop, else `X-Real-IP`,
/// else `"unknown"`.
pub fn request_origin(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or("unknown")
        .to_string()
}

/// Tags each request with a correlation id and logs its outcome.
async fn log_requests(request: Request, next: Next) -> Response {
    let correlation_id = Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let origin = request_origin(request.headers());
    let start_time = Instant::now();

    let span = info_span!("request", correlation_id = %correlation_id);
    let mut response = next.run(request).instrument(span).await;

    info!(
        correlation_id = %correlation_id,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        latency_us = start_time.elapsed().as_micros() as u64,
        origin = %origin,
        "Request handled"
    );

    if let Ok(value) = HeaderValue::from_str(&correlation_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Handler for `GET /`.
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "message": "Payslip engine is running" }))
}

/// Handler for `POST /seed`.
///
/// Creates `employee1` to `employee100` with salaries stepping up from
/// 5,000,000 by 100,000. Existing usernames are left untouched.
async fn seed_handler(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let store = state.store();
    let mut created = 0u32;

    for i in 0..SEED_EMPLOYEES {
        let username = format!("employee{}", i + 1);
        if store.find_employee_by_username(&username).await?.is_some() {
            continue;
        }
        store
            .create_employee(NewEmployee {
                username,
                salary: Decimal::from(5_000_000u64 + u64::from(i) * 100_000),
            })
            .await?;
        created += 1;
    }

    info!(created, "Employees seeded");
    Ok(Json(json!({
        "message": format!("Seeded {} employees.", created),
        "created": created,
    })))
}

/// Handler for `POST /admin/payroll-periods`.
async fn create_period_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreatePeriodRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let admin_id = request.admin_id;
    let new_period: NewPayrollPeriod = request.into();

    let period = state.store().create_period(new_period, state.now()).await?;
    info!(
        period_id = period.id,
        start_date = %period.start_date,
        end_date = %period.end_date,
        "Payroll period created"
    );

    state
        .audit()
        .record(AuditEntry::new(
            admin_id,
            ActorType::Admin,
            ACTION_CREATED_PERIOD,
            format!(
                "Created new payroll period ID {} from {} to {}.",
                period.id, period.start_date, period.end_date
            ),
            request_origin(&headers),
        ))
        .await;

    Ok((StatusCode::CREATED, Json(period)))
}

/// Handler for `POST /admin/run-payroll`.
///
/// Queues the run and answers 202 without waiting for it.
async fn run_payroll_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<RunPayrollRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;

    state.trigger().submit(RunRequest {
        period_id: request.payroll_period_id,
        actor_id: request.admin_id,
        origin: request_origin(&headers),
    })?;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "message": "Payroll run has been initiated. This may take a few moments."
        })),
    ))
}

/// Handler for `GET /admin/payslips/summary`.
async fn payslip_summary_handler(
    State(state): State<AppState>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;

    let payslips = state.store().list_payslips_for_period(query.period_id).await?;
    if payslips.is_empty() {
        return Err(ApiErrorResponse::not_found(
            "PAYSLIPS_NOT_FOUND",
            "No payslips found for this period. Has payroll been run?",
        ));
    }

    Ok(Json(PeriodPayout::from_payslips(query.period_id, &payslips)))
}

/// Handler for `GET /admin/audit-logs`.
async fn audit_logs_handler(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.store().list_audit_records().await?))
}

/// Handler for `POST /employee/attendance`.
async fn attendance_handler(
    State(state): State<AppState>,
    payload: Result<Json<AttendanceRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let now = state.now();

    if let Err(e) = request.check_window(state.config().submission_rules(), now) {
        warn!(employee_id = request.employee_id, error = %e, "Attendance rejected");
        return Err(e.into());
    }

    let record = state
        .store()
        .record_attendance(request.employee_id, now)
        .await?;
    info!(employee_id = record.employee_id, "Attendance recorded");
    Ok((StatusCode::CREATED, Json(record)))
}

/// Handler for `POST /employee/overtime`.
async fn overtime_handler(
    State(state): State<AppState>,
    payload: Result<Json<OvertimeRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let now = state.now();
    let employee_id = request.employee_id;

    let overtime = match request.validate(state.config().submission_rules(), now) {
        Ok(overtime) => overtime,
        Err(e) => {
            warn!(employee_id, error = %e, "Overtime rejected");
            return Err(e.into());
        }
    };

    let entry = state.store().submit_overtime(overtime, now).await?;
    info!(
        employee_id,
        overtime_id = entry.id,
        hours = %entry.hours,
        "Overtime submitted"
    );
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Handler for `POST /employee/reimbursements`.
async fn reimbursement_handler(
    State(state): State<AppState>,
    payload: Result<Json<ReimbursementRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let reimbursement = request.validate(state.config().submission_rules())?;

    let entry = state
        .store()
        .submit_reimbursement(reimbursement, state.now())
        .await?;
    info!(
        employee_id = entry.employee_id,
        reimbursement_id = entry.id,
        amount = %entry.amount,
        "Reimbursement submitted"
    );
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Handler for `GET /employee/payslip`.
async fn payslip_handler(
    State(state): State<AppState>,
    query: Result<Query<PayslipQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;

    let payslip = state
        .store()
        .find_payslip(query.employee_id, query.period_id)
        .await?
        .ok_or(EngineError::PayslipNotFound {
            employee_id: query.employee_id,
            period_id: query.period_id,
        })?;

    Ok(Json(payslip))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(request_origin(&headers), "203.0.113.7");
    }

    #[test]
    fn test_origin_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(request_origin(&headers), "10.0.0.2");
    }

    #[test]
    fn test_origin_unknown_without_headers() {
        assert_eq!(request_origin(&HeaderMap::new()), "unknown");
    }
}
