use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single employer's store location, the unit employees are scoped to.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Branch {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "역삼 1호점")]
    pub name: String,
    #[schema(example = "X7K2QA")]
    pub branch_code: String,
}
