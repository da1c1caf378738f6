use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::model::role::Role;
use crate::utils::db_utils::{build_update_sql, execute_update};

#[derive(Serialize, ToSchema)]
pub struct ProfileResponse {
    #[schema(example = "김철수")]
    pub name: String,
    #[schema(example = "worker@example.com")]
    pub email: String,
    #[schema(example = "employee")]
    pub role: String,
    /// Branch the account belongs to, once linked.
    #[schema(example = "GS25 역삼점")]
    pub branch_name: Option<String>,
    #[schema(example = "X7K2QA")]
    pub branch_code: Option<String>,
    /// Only present for employee accounts.
    #[schema(example = "approved")]
    pub employee_status: Option<String>,
}

/// Profile for the signed-in account, with its branch link.
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Profile"
)]
pub async fn get_profile(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let row = match auth.role {
        Role::Employee => {
            sqlx::query_as::<_, (String, String, Option<String>, Option<String>, Option<String>)>(
                r#"
                SELECT u.name, u.email, b.name, e.branch_code, e.status
                FROM users u
                LEFT JOIN employees e ON e.user_id = u.id
                LEFT JOIN branches b ON b.branch_code = e.branch_code
                WHERE u.id = ?
                "#,
            )
            .bind(auth.user_id)
            .fetch_optional(pool.get_ref())
            .await
        }
        Role::Employer => {
            sqlx::query_as::<_, (String, String, Option<String>, Option<String>, Option<String>)>(
                r#"
                SELECT u.name, u.email, b.name, b.branch_code, NULL
                FROM users u
                LEFT JOIN branches b ON b.employer_id = u.id
                WHERE u.id = ?
                "#,
            )
            .bind(auth.user_id)
            .fetch_optional(pool.get_ref())
            .await
        }
    }
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Failed to fetch profile");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let Some((name, email, branch_name, branch_code, employee_status)) = row else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "User not found"
        })));
    };

    Ok(HttpResponse::Ok().json(ProfileResponse {
        name,
        email,
        role: auth.role.to_string(),
        branch_name,
        branch_code,
        employee_status,
    }))
}

/// Partial profile update. Only `name` is editable.
#[utoipa::path(
    put,
    path = "/api/v1/profile",
    request_body = Object,
    responses(
        (status = 200, description = "Profile updated", body = Object, example = json!({
            "message": "Profile updated"
        })),
        (status = 400, description = "Bad payload"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Profile"
)]
pub async fn update_profile(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<serde_json::Value>,
) -> actix_web::Result<impl Responder> {
    let update = build_update_sql("users", &payload, &["name"], "id", auth.user_id as i64)?;

    let affected = execute_update(pool.get_ref(), update).await.map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Profile update failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "User not found"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Profile updated"
    })))
}
