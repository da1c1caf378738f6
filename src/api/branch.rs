use std::collections::HashSet;

use actix_web::{HttpResponse, Responder, web};
use chrono::{Duration, Local, NaiveTime};
use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::model::branch::Branch;
use crate::utils::qr_cache;
use crate::utils::qr_token::issue_qr_token;

#[derive(Serialize, ToSchema)]
pub struct RosterEntry {
    pub employee_id: u64,
    #[schema(example = "김철수")]
    pub name: String,
    #[schema(example = "approved")]
    pub status: String,
    pub is_working: bool,
}

#[derive(Serialize, ToSchema)]
pub struct ShiftEntry {
    #[schema(example = "09:00 - 14:00")]
    pub time: String,
    #[schema(example = "김철수")]
    pub name: String,
}

#[derive(Serialize, ToSchema)]
pub struct BranchOverview {
    pub branch: Branch,
    #[schema(example = 3)]
    pub total_employees: usize,
    #[schema(example = 2)]
    pub working_now: usize,
    #[schema(example = 1)]
    pub pending: usize,
    pub shifts: Vec<ShiftEntry>,
    pub employees: Vec<RosterEntry>,
}

async fn own_branch(employer_id: u64, pool: &MySqlPool) -> Result<Option<Branch>, sqlx::Error> {
    sqlx::query_as::<_, Branch>(
        "SELECT id, name, branch_code FROM branches WHERE employer_id = ? LIMIT 1",
    )
    .bind(employer_id)
    .fetch_optional(pool)
    .await
}

/// Branch info for the signed-in employer.
#[utoipa::path(
    get,
    path = "/api/v1/branch",
    responses(
        (status = 200, description = "Branch found", body = Branch),
        (status = 404, description = "No branch registered"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Branch"
)]
pub async fn get_branch(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_employer()?;

    let branch = own_branch(auth.user_id, pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Failed to fetch branch");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match branch {
        Some(b) => Ok(HttpResponse::Ok().json(b)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "No branch registered"
        }))),
    }
}

/// The day's clock-in QR token. Stable within a day, rotates at midnight.
#[utoipa::path(
    get,
    path = "/api/v1/branch/qr",
    responses(
        (status = 200, description = "QR token for today", body = Object, example = json!({
            "qr_token": "eyJhbGciOi...",
            "branch_code": "X7K2QA",
            "date": "2024-03-04"
        })),
        (status = 404, description = "No branch registered"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Branch"
)]
pub async fn qr_code(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    auth.require_employer()?;

    let branch = match own_branch(auth.user_id, pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Failed to fetch branch");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })? {
        Some(b) => b,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "message": "No branch registered"
            })));
        }
    };

    let today = Local::now().date_naive();

    let token = match qr_cache::get(branch.id, today).await {
        Some(t) => t,
        None => {
            let (token, _) = issue_qr_token(branch.id, &branch.branch_code, &config.jwt_secret);
            qr_cache::put(branch.id, today, token.clone()).await;
            token
        }
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "qr_token": token,
        "branch_code": branch.branch_code,
        "date": today
    })))
}

/// Store dashboard: counts, today's shifts and the live roster.
#[utoipa::path(
    get,
    path = "/api/v1/branch/overview",
    responses(
        (status = 200, description = "Branch overview", body = BranchOverview),
        (status = 404, description = "No branch registered"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Branch"
)]
pub async fn overview(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_employer()?;

    let branch = match own_branch(auth.user_id, pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Failed to fetch branch");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })? {
        Some(b) => b,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "message": "No branch registered"
            })));
        }
    };

    let roster = sqlx::query_as::<_, (u64, String, String)>(
        r#"
        SELECT e.id, u.name, e.status
        FROM employees e
        JOIN users u ON u.id = e.user_id
        WHERE e.branch_code = ?
        ORDER BY e.status DESC, u.name
        "#,
    )
    .bind(&branch.branch_code)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch roster");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let today_start = Local::now().date_naive().and_time(NaiveTime::MIN);
    let tomorrow_start = today_start + Duration::days(1);

    // Employees with an open punch right now.
    let working: HashSet<u64> = sqlx::query_as::<_, (u64,)>(
        r#"
        SELECT a.employee_id
        FROM attendance a
        JOIN employees e ON e.id = a.employee_id
        WHERE e.branch_code = ?
        AND a.clock_in_time >= ? AND a.clock_in_time < ?
        AND a.clock_out_time IS NULL
        "#,
    )
    .bind(&branch.branch_code)
    .bind(today_start)
    .bind(tomorrow_start)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch open punches");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?
    .into_iter()
    .map(|(id,)| id)
    .collect();

    let shift_rows = sqlx::query_as::<_, (NaiveTime, NaiveTime, String)>(
        r#"
        SELECT s.start_time, s.end_time, u.name
        FROM schedules s
        JOIN employees e ON e.id = s.employee_id
        JOIN users u ON u.id = e.user_id
        WHERE e.branch_code = ? AND s.date = ? AND e.status = 'approved'
        ORDER BY s.start_time
        "#,
    )
    .bind(&branch.branch_code)
    .bind(today_start.date())
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch today's shifts");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let shifts = shift_rows
        .into_iter()
        .map(|(start, end, name)| ShiftEntry {
            time: format!("{} - {}", start.format("%H:%M"), end.format("%H:%M")),
            name,
        })
        .collect();

    let employees: Vec<RosterEntry> = roster
        .into_iter()
        .map(|(employee_id, name, status)| RosterEntry {
            is_working: status == "approved" && working.contains(&employee_id),
            employee_id,
            name,
            status,
        })
        .collect();

    let total_employees = employees.iter().filter(|e| e.status == "approved").count();
    let pending = employees.iter().filter(|e| e.status == "pending").count();

    Ok(HttpResponse::Ok().json(BranchOverview {
        branch,
        total_employees,
        working_now: working.len(),
        pending,
        shifts,
        employees,
    }))
}

/// Approve a pending employee of the caller's branch.
#[utoipa::path(
    put,
    path = "/api/v1/branch/employees/{employee_id}/approve",
    params(
        ("employee_id" = u64, Path, description = "ID of the employee to approve")
    ),
    responses(
        (status = 200, description = "Employee approved", body = Object, example = json!({
            "message": "Employee approved"
        })),
        (status = 400, description = "Employee not found or already processed", body = Object, example = json!({
            "message": "Employee not found or already processed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Branch"
)]
pub async fn approve_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_employer()?;

    let employee_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE employees e
        JOIN branches b ON b.branch_code = e.branch_code
        SET e.status = 'approved'
        WHERE e.id = ?
        AND b.employer_id = ?
        AND e.status = 'pending'
        "#,
    )
    .bind(employee_id)
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Approve employee failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Employee not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Employee approved"
    })))
}

/// Reject (remove) a pending employee of the caller's branch.
#[utoipa::path(
    delete,
    path = "/api/v1/branch/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "ID of the employee to reject")
    ),
    responses(
        (status = 200, description = "Employee rejected", body = Object, example = json!({
            "message": "Employee rejected"
        })),
        (status = 400, description = "Employee not found or already processed", body = Object, example = json!({
            "message": "Employee not found or already processed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Branch"
)]
pub async fn reject_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_employer()?;

    let employee_id = path.into_inner();

    let result = sqlx::query(
        r#"
        DELETE e FROM employees e
        JOIN branches b ON b.branch_code = e.branch_code
        WHERE e.id = ?
        AND b.employer_id = ?
        AND e.status = 'pending'
        "#,
    )
    .bind(employee_id)
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Reject employee failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Employee not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Employee rejected"
    })))
}
