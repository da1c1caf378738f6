use anyhow::{Result, anyhow};
use chrono::{Datelike, Duration, Local, NaiveTime, Weekday};
use sqlx::MySqlPool;

use crate::auth::password::hash_password;
use crate::utils::branch_cache::{self, BranchInfo};
use crate::utils::branch_filter;

const DEMO_BRANCH_CODE: &str = "DEMO01";
const DEMO_EMPLOYER_EMAIL: &str = "owner@demo.albacheck.local";
const DEMO_EMPLOYEE_EMAIL: &str = "worker@demo.albacheck.local";
const DEMO_PASSWORD: &str = "demo1234";

/// Seed a demo branch with one approved employee, a month of weekday
/// shifts and punches to match. Runs once; a reseeded database is
/// detected by the demo employer account and skipped.
pub async fn run(pool: &MySqlPool) -> Result<()> {
    let existing: Option<(u64,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(DEMO_EMPLOYER_EMAIL)
        .fetch_optional(pool)
        .await?;

    if existing.is_some() {
        log::info!("Demo data already present, skipping seed");
        return Ok(());
    }

    let password_hash = hash_password(DEMO_PASSWORD);

    let employer_id = sqlx::query(
        "INSERT INTO users (email, password, name, role_id) VALUES (?, ?, ?, 1)",
    )
    .bind(DEMO_EMPLOYER_EMAIL)
    .bind(&password_hash)
    .bind("데모 사장님")
    .execute(pool)
    .await?
    .last_insert_id();

    let branch_id = sqlx::query(
        "INSERT INTO branches (employer_id, name, branch_code) VALUES (?, ?, ?)",
    )
    .bind(employer_id)
    .bind("알바체크 데모점")
    .bind(DEMO_BRANCH_CODE)
    .execute(pool)
    .await?
    .last_insert_id();

    let worker_user_id = sqlx::query(
        "INSERT INTO users (email, password, name, role_id) VALUES (?, ?, ?, 2)",
    )
    .bind(DEMO_EMPLOYEE_EMAIL)
    .bind(&password_hash)
    .bind("김알바")
    .execute(pool)
    .await?
    .last_insert_id();

    let employee_id = sqlx::query(
        "INSERT INTO employees (user_id, branch_code, status) VALUES (?, ?, 'approved')",
    )
    .bind(worker_user_id)
    .bind(DEMO_BRANCH_CODE)
    .execute(pool)
    .await?
    .last_insert_id();

    let today = Local::now().date_naive();
    let first_day = today
        .with_day(1)
        .ok_or_else(|| anyhow!("invalid first day of month"))?;

    let shift_start = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
    let shift_end = NaiveTime::from_hms_opt(18, 0, 0).unwrap();

    let mut day = first_day;
    while day.month() == today.month() {
        let is_weekday = !matches!(day.weekday(), Weekday::Sat | Weekday::Sun);
        if is_weekday {
            sqlx::query(
                "INSERT INTO schedules (employee_id, date, start_time, end_time) VALUES (?, ?, ?, ?)",
            )
            .bind(employee_id)
            .bind(day)
            .bind(shift_start)
            .bind(shift_end)
            .execute(pool)
            .await?;

            // Past weekdays get punches; day 10 arrives late for variety.
            if day < today {
                let in_minute = if day.day() == 10 { 25 } else { 5 };
                let clock_in = day.and_time(NaiveTime::from_hms_opt(9, in_minute, 12).unwrap());
                let clock_out = day.and_time(NaiveTime::from_hms_opt(18, 4, 30).unwrap());

                sqlx::query(
                    "INSERT INTO attendance (employee_id, clock_in_time, clock_out_time) VALUES (?, ?, ?)",
                )
                .bind(employee_id)
                .bind(clock_in)
                .bind(clock_out)
                .execute(pool)
                .await?;
            }
        }
        day += Duration::days(1);
    }

    branch_filter::insert(DEMO_BRANCH_CODE);
    branch_cache::put(
        DEMO_BRANCH_CODE,
        BranchInfo {
            id: branch_id,
            name: "알바체크 데모점".to_string(),
        },
    )
    .await;

    log::info!(
        "Demo data seeded: branch {} with employee {}",
        DEMO_BRANCH_CODE,
        employee_id
    );
    Ok(())
}
