use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Approval state of an employee within a branch. New joiners start pending
/// until the employer approves them.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EmployeeStatus {
    Pending,
    Approved,
}

/// Employee row joined to the owning user, as needed by the clock endpoints.
#[derive(Debug, sqlx::FromRow)]
pub struct EmployeeLink {
    pub id: u64,
    pub branch_code: String,
    pub status: String,
}

impl EmployeeLink {
    pub fn is_approved(&self) -> bool {
        self.status
            .parse::<EmployeeStatus>()
            .map(|s| s == EmployeeStatus::Approved)
            .unwrap_or(false)
    }
}
