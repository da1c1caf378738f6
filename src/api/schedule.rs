use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::schedule::Schedule;
use crate::reconcile::{month_bounds, parse_time_of_day};

#[derive(Deserialize, ToSchema)]
pub struct UpsertSchedule {
    #[schema(example = "2024-03-04", format = "date", value_type = String)]
    pub date: NaiveDate,
    /// `HH:MM` or `HH:MM:SS`
    #[schema(example = "09:00")]
    pub start_time: String,
    /// `HH:MM` or `HH:MM:SS`; not after `start_time` means the shift
    /// crosses midnight.
    #[schema(example = "18:00")]
    pub end_time: String,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ScheduleFilter {
    #[schema(example = 2024)]
    pub year: Option<i32>,
    #[schema(example = 3)]
    pub month: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct ScheduleListResponse {
    pub data: Vec<Schedule>,
}

/// List own schedules, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/schedules",
    params(ScheduleFilter),
    responses(
        (status = 200, description = "Schedule list", body = ScheduleListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Schedule"
)]
pub async fn list_schedules(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ScheduleFilter>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;

    let bounds = match (query.year, query.month) {
        (Some(year), Some(month)) => match month_bounds(year, month) {
            Some(b) => Some(b),
            None => {
                return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                    "message": "Invalid year/month"
                })));
            }
        },
        _ => None,
    };

    let data = match bounds {
        Some((first_day, last_day)) => {
            sqlx::query_as::<_, Schedule>(
                r#"
                SELECT id, employee_id, date, start_time, end_time
                FROM schedules
                WHERE employee_id = ? AND date BETWEEN ? AND ?
                ORDER BY date DESC
                "#,
            )
            .bind(employee_id)
            .bind(first_day)
            .bind(last_day)
            .fetch_all(pool.get_ref())
            .await
        }
        None => {
            sqlx::query_as::<_, Schedule>(
                r#"
                SELECT id, employee_id, date, start_time, end_time
                FROM schedules
                WHERE employee_id = ?
                ORDER BY date DESC
                "#,
            )
            .bind(employee_id)
            .fetch_all(pool.get_ref())
            .await
        }
    }
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to fetch schedules");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(ScheduleListResponse { data }))
}

/// Create or replace the shift planned for a date.
#[utoipa::path(
    post,
    path = "/api/v1/schedules",
    request_body = UpsertSchedule,
    responses(
        (status = 200, description = "Schedule saved", body = Object, example = json!({
            "message": "Schedule saved"
        })),
        (status = 400, description = "Bad time of day"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Schedule"
)]
pub async fn upsert_schedule(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<UpsertSchedule>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;

    let (Some(start_time), Some(end_time)) = (
        parse_time_of_day(&payload.start_time),
        parse_time_of_day(&payload.end_time),
    ) else {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Times must be HH:MM or HH:MM:SS"
        })));
    };

    // One shift per date; re-posting a date replaces it.
    sqlx::query(
        r#"
        INSERT INTO schedules (employee_id, date, start_time, end_time)
        VALUES (?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE start_time = VALUES(start_time), end_time = VALUES(end_time)
        "#,
    )
    .bind(employee_id)
    .bind(payload.date)
    .bind(start_time)
    .bind(end_time)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to save schedule");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Schedule saved"
    })))
}

/// Delete one of the caller's schedules.
#[utoipa::path(
    delete,
    path = "/api/v1/schedules/{schedule_id}",
    params(
        ("schedule_id" = u64, Path, description = "ID of the schedule to delete")
    ),
    responses(
        (status = 200, description = "Schedule deleted", body = Object, example = json!({
            "message": "Schedule deleted"
        })),
        (status = 404, description = "Schedule not found", body = Object, example = json!({
            "message": "Schedule not found"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Schedule"
)]
pub async fn delete_schedule(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    let schedule_id = path.into_inner();

    let result = sqlx::query(r#"DELETE FROM schedules WHERE id = ? AND employee_id = ?"#)
        .bind(schedule_id)
        .bind(employee_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, schedule_id, "Failed to delete schedule");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Schedule not found"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Schedule deleted"
    })))
}
