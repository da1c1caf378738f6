use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Raw attendance row as stored. `clock_in_time` is nullable in the store;
/// rows without one are treated as malformed and ignored by reconciliation.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRow {
    pub id: u64,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub clock_in_time: Option<NaiveDateTime>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub clock_out_time: Option<NaiveDateTime>,
}
