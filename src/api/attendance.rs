use actix_web::{HttpResponse, Responder, web};
use chrono::{Duration, Local, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::model::attendance::AttendanceRow;
use crate::model::employee::EmployeeLink;
use crate::model::schedule::Schedule;
use crate::reconcile::{
    DayReconciliation, MonthlySummary, bucket_punches, bucket_shifts, month_bounds,
    reconcile_month,
};
use crate::utils::qr_token::verify_qr_token;

#[derive(Deserialize, ToSchema)]
pub struct ClockReq {
    /// Token scanned from the branch QR code.
    pub qr_token: String,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct MonthQuery {
    #[schema(example = 2024)]
    pub year: i32,
    #[schema(example = 3)]
    pub month: u32,
}

#[derive(Serialize, ToSchema)]
pub struct MonthSummaryResponse {
    pub year: i32,
    pub month: u32,
    pub days: Vec<DayReconciliation>,
    pub summary: MonthlySummary,
}

/// Load the employee row and check the scanned QR token against it.
/// Returns the employee link, or an error response for the caller to relay.
async fn verify_clock_request(
    employee_id: u64,
    qr_token: &str,
    pool: &MySqlPool,
    config: &Config,
) -> Result<EmployeeLink, HttpResponse> {
    let claims = verify_qr_token(qr_token, &config.jwt_secret).map_err(|_| {
        HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Invalid or expired QR code"
        }))
    })?;

    // Tokens are only honored on the day they were issued for.
    if claims.date != Local::now().date_naive() {
        return Err(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "QR code has expired, scan a fresh one"
        })));
    }

    let employee = sqlx::query_as::<_, EmployeeLink>(
        "SELECT id, branch_code, status FROM employees WHERE id = ?",
    )
    .bind(employee_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to fetch employee");
        HttpResponse::InternalServerError().json(serde_json::json!({
            "message": "Internal Server Error"
        }))
    })?
    .ok_or_else(|| {
        HttpResponse::Forbidden().json(serde_json::json!({
            "message": "No employee profile"
        }))
    })?;

    if !employee.is_approved() {
        return Err(HttpResponse::Forbidden().json(serde_json::json!({
            "message": "Employee not approved yet"
        })));
    }

    if employee.branch_code != claims.branch_code {
        return Err(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "QR code belongs to a different branch"
        })));
    }

    Ok(employee)
}

/// Clock-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/clock-in",
    request_body = ClockReq,
    responses(
        (status = 200, description = "Clocked in successfully", body = Object, example = json!({
            "message": "Clocked in successfully",
            "clock_in_time": "2024-03-04T09:01:12"
        })),
        (status = 400, description = "Already clocked in today or bad QR code"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn clock_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<ClockReq>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;

    if let Err(resp) =
        verify_clock_request(employee_id, &payload.qr_token, pool.get_ref(), &config).await
    {
        return Ok(resp);
    }

    let now = Local::now().naive_local();
    let today_start = now.date().and_time(NaiveTime::MIN);
    let tomorrow_start = today_start + Duration::days(1);

    let already: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM attendance
        WHERE employee_id = ? AND clock_in_time >= ? AND clock_in_time < ?
        "#,
    )
    .bind(employee_id)
    .bind(today_start)
    .bind(tomorrow_start)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Clock-in lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if already > 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Already clocked in today"
        })));
    }

    sqlx::query(r#"INSERT INTO attendance (employee_id, clock_in_time) VALUES (?, ?)"#)
        .bind(employee_id)
        .bind(now)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Clock-in failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Clocked in successfully",
        "clock_in_time": now
    })))
}

/// Clock-out endpoint
#[utoipa::path(
    put,
    path = "/api/v1/attendance/clock-out",
    request_body = ClockReq,
    responses(
        (status = 200, description = "Clocked out successfully", body = Object, example = json!({
            "message": "Clocked out successfully",
            "clock_out_time": "2024-03-04T18:03:40"
        })),
        (status = 400, description = "No active clock-in found for today", body = Object, example = json!({
            "message": "No active clock-in found for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn clock_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<ClockReq>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;

    if let Err(resp) =
        verify_clock_request(employee_id, &payload.qr_token, pool.get_ref(), &config).await
    {
        return Ok(resp);
    }

    let now = Local::now().naive_local();
    let today_start = now.date().and_time(NaiveTime::MIN);
    let tomorrow_start = today_start + Duration::days(1);

    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET clock_out_time = ?
        WHERE employee_id = ?
        AND clock_in_time >= ? AND clock_in_time < ?
        AND clock_out_time IS NULL
        "#,
    )
    .bind(now)
    .bind(employee_id)
    .bind(today_start)
    .bind(tomorrow_start)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Clock-out failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "No active clock-in found for today"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Clocked out successfully",
        "clock_out_time": now
    })))
}

/// Today's punch pair for the QR screen.
#[utoipa::path(
    get,
    path = "/api/v1/attendance/today",
    responses(
        (status = 200, description = "Today's record", body = Object, example = json!({
            "clock_in_time": "2024-03-04T09:01:12",
            "clock_out_time": null
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn today(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;

    let today_start = Local::now().date_naive().and_time(NaiveTime::MIN);
    let tomorrow_start = today_start + Duration::days(1);

    let record = sqlx::query_as::<_, AttendanceRow>(
        r#"
        SELECT id, clock_in_time, clock_out_time
        FROM attendance
        WHERE employee_id = ? AND clock_in_time >= ? AND clock_in_time < ?
        ORDER BY clock_in_time DESC
        LIMIT 1
        "#,
    )
    .bind(employee_id)
    .bind(today_start)
    .bind(tomorrow_start)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to fetch today's record");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "clock_in_time": record.as_ref().and_then(|r| r.clock_in_time),
        "clock_out_time": record.as_ref().and_then(|r| r.clock_out_time),
    })))
}

/// Monthly dashboard: reconcile the month's punches against planned shifts.
#[utoipa::path(
    get,
    path = "/api/v1/attendance/summary",
    params(MonthQuery),
    responses(
        (status = 200, description = "Per-day reconciliation plus monthly aggregates", body = MonthSummaryResponse),
        (status = 400, description = "Invalid year/month"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn monthly_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;

    let Some((first_day, last_day)) = month_bounds(query.year, query.month) else {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Invalid year/month"
        })));
    };

    // Month boundary is inclusive on the clock-in timestamp.
    let month_start = first_day.and_time(NaiveTime::MIN);
    let next_month_start = (last_day + Duration::days(1)).and_time(NaiveTime::MIN);

    let attendance_rows = sqlx::query_as::<_, AttendanceRow>(
        r#"
        SELECT id, clock_in_time, clock_out_time
        FROM attendance
        WHERE employee_id = ? AND clock_in_time >= ? AND clock_in_time < ?
        "#,
    )
    .bind(employee_id)
    .bind(month_start)
    .bind(next_month_start)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to fetch attendance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let schedule_rows = sqlx::query_as::<_, Schedule>(
        r#"
        SELECT id, employee_id, date, start_time, end_time
        FROM schedules
        WHERE employee_id = ? AND date BETWEEN ? AND ?
        "#,
    )
    .bind(employee_id)
    .bind(first_day)
    .bind(last_day)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to fetch schedules");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let punches = bucket_punches(attendance_rows);
    let shifts = bucket_shifts(schedule_rows);
    let (days, summary) = reconcile_month(
        &punches,
        &shifts,
        config.grace_period_minutes,
        config.hourly_rate_krw,
    );

    Ok(HttpResponse::Ok().json(MonthSummaryResponse {
        year: query.year,
        month: query.month,
        days,
        summary,
    }))
}
