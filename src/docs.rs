use crate::api::attendance::{ClockReq, MonthQuery, MonthSummaryResponse};
use crate::api::branch::{BranchOverview, RosterEntry, ShiftEntry};
use crate::api::profile::ProfileResponse;
use crate::api::schedule::{ScheduleFilter, ScheduleListResponse, UpsertSchedule};
use crate::model::attendance::AttendanceRow;
use crate::model::branch::Branch;
use crate::model::schedule::Schedule;
use crate::reconcile::{DayReconciliation, DayStatus, MonthlySummary};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};
#[derive(OpenApi)]
#[openapi(
    info(
        title = "AlbaCheck API",
        version = "1.0.0",
        description = r#"
## 알바체크 (AlbaCheck)

Attendance and scheduling backend connecting hourly employees with
employers at the branch level.

### 🔹 Key Features
- **QR Attendance**
  - Clock in and out by scanning the branch QR code; the code rotates daily
- **Schedule Planning**
  - Employees plan shifts per date, including overnight shifts
- **Monthly Reconciliation**
  - Punches are matched against planned shifts with a grace window;
    on-time days credit the planned duration toward the wage estimate
- **Branch Management**
  - Employers approve or reject joining employees and watch the live roster

### 🔐 Security
Protected endpoints use **JWT Bearer authentication**. Employees and
employers see disjoint resources based on their role.

### 📦 Response Format
- JSON-based RESTful responses

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,
        crate::api::attendance::today,
        crate::api::attendance::monthly_summary,

        crate::api::schedule::list_schedules,
        crate::api::schedule::upsert_schedule,
        crate::api::schedule::delete_schedule,

        crate::api::branch::get_branch,
        crate::api::branch::qr_code,
        crate::api::branch::overview,
        crate::api::branch::approve_employee,
        crate::api::branch::reject_employee,

        crate::api::profile::get_profile,
        crate::api::profile::update_profile
    ),
    components(
        schemas(
            ClockReq,
            MonthQuery,
            MonthSummaryResponse,
            DayReconciliation,
            DayStatus,
            MonthlySummary,
            AttendanceRow,
            Schedule,
            UpsertSchedule,
            ScheduleFilter,
            ScheduleListResponse,
            Branch,
            BranchOverview,
            RosterEntry,
            ShiftEntry,
            ProfileResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "QR clock-in/out and monthly reconciliation APIs"),
        (name = "Schedule", description = "Shift planning APIs"),
        (name = "Branch", description = "Employer branch management APIs"),
        (name = "Profile", description = "Account profile APIs"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
