use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct RegisterEmployeeReq {
    #[schema(example = "worker@example.com")]
    pub email: String,
    pub password: String,
    #[schema(example = "김철수")]
    pub name: String,
    /// Code of the branch the employee wants to join.
    #[schema(example = "X7K2QA")]
    pub branch_code: String,
}

#[derive(Deserialize, ToSchema)]
pub struct RegisterEmployerReq {
    #[schema(example = "owner@example.com")]
    pub email: String,
    pub password: String,
    #[schema(example = "박사장")]
    pub name: String,
    #[schema(example = "역삼 1호점")]
    pub branch_name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    pub email: String,
    pub password: String,
}

#[derive(FromRow)]
pub struct UserSql {
    pub id: u64,
    pub email: String,
    pub password: String,
    pub role_id: u8,
    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String, // email
    pub role: u8,    // role id
    pub exp: usize,
    pub jti: String,

    pub token_type: TokenType,
    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
