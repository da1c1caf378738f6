//! Monthly attendance reconciliation.
//!
//! Matches recorded punches against planned shifts for one calendar month,
//! applying a symmetric grace window around the scheduled boundaries. A day
//! whose punches both land in tolerance is credited the *planned* shift
//! length, not the raw punch-to-punch interval, so arriving a few minutes
//! early or leaving a few minutes late never shifts pay.
//!
//! Pure functions over pre-fetched collections. Callers filter rows to the
//! month boundary, inclusive on the clock-in timestamp.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use strum::Display;
use utoipa::ToSchema;

use crate::model::attendance::AttendanceRow;
use crate::model::schedule::Schedule;

/// Punch pair for one calendar day, keyed by the clock-in date.
#[derive(Debug, Clone, PartialEq)]
pub struct PunchRecord {
    pub id: u64,
    pub clock_in: NaiveDateTime,
    pub clock_out: Option<NaiveDateTime>,
}

/// Planned shift for one calendar day. `end_time <= start_time` means the
/// shift runs past midnight into the next day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftPlan {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Per-day classification. Descriptive only, not a stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DayStatus {
    /// Both punches inside the grace window of the planned shift.
    OnTime,
    /// Both punches present but no in-tolerance schedule match.
    Worked,
    /// Clock-in only, still on shift (or never clocked out).
    InProgress,
    /// A shift was planned but no punch was recorded.
    ScheduledOnly,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DayReconciliation {
    #[schema(example = "2024-03-04", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub clock_in: Option<NaiveDateTime>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub clock_out: Option<NaiveDateTime>,
    #[schema(example = "09:00:00", value_type = Option<String>)]
    pub scheduled_start: Option<NaiveTime>,
    #[schema(example = "18:00:00", value_type = Option<String>)]
    pub scheduled_end: Option<NaiveTime>,
    pub status: DayStatus,
    /// Planned shift minutes credited for this day; zero unless on time.
    #[schema(example = 540)]
    pub payable_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthlySummary {
    #[schema(example = 540)]
    pub total_payable_minutes: i64,
    /// Days with both a clock-in and a clock-out, in-tolerance or not.
    #[schema(example = 1)]
    pub worked_day_count: u32,
    #[schema(example = 99000)]
    pub estimated_wage: i64,
    #[schema(example = "9시간 0분")]
    pub total_payable_label: String,
    #[schema(example = "99,000")]
    pub estimated_wage_label: String,
}

/// Accepts `HH:MM:SS` and `HH:MM`.
pub fn parse_time_of_day(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

/// First and last calendar day of the month, or `None` for an invalid month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_first - Duration::days(1)))
}

/// Group raw rows by clock-in date. Rows without a clock-in are malformed
/// and dropped. If the store yields two rows for one date, the row with the
/// latest clock-in wins; ties go to the later row id.
pub fn bucket_punches(rows: Vec<AttendanceRow>) -> BTreeMap<NaiveDate, PunchRecord> {
    let mut out: BTreeMap<NaiveDate, PunchRecord> = BTreeMap::new();

    for row in rows {
        let Some(clock_in) = row.clock_in_time else {
            continue;
        };
        let record = PunchRecord {
            id: row.id,
            clock_in,
            clock_out: row.clock_out_time,
        };
        out.entry(clock_in.date())
            .and_modify(|existing| {
                let newer = record.clock_in > existing.clock_in
                    || (record.clock_in == existing.clock_in && record.id > existing.id);
                if newer {
                    *existing = record.clone();
                }
            })
            .or_insert(record);
    }

    out
}

/// Group planned shifts by date. At most one row per date comes back from
/// the store, so a plain insert suffices.
pub fn bucket_shifts(rows: Vec<Schedule>) -> BTreeMap<NaiveDate, ShiftPlan> {
    rows.into_iter()
        .map(|s| {
            (
                s.date,
                ShiftPlan {
                    start_time: s.start_time,
                    end_time: s.end_time,
                },
            )
        })
        .collect()
}

fn shift_bounds(date: NaiveDate, plan: &ShiftPlan) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(plan.start_time);
    let end_date = if plan.end_time <= plan.start_time {
        date + Duration::days(1)
    } else {
        date
    };
    (start, end_date.and_time(plan.end_time))
}

// Instant comparison, not a minute diff: truncation would let punches up
// to 59 seconds past the window slip through.
fn within_grace(actual: NaiveDateTime, boundary: NaiveDateTime, grace_minutes: i64) -> bool {
    let grace = Duration::minutes(grace_minutes);
    boundary - grace <= actual && actual <= boundary + grace
}

/// Reconcile one month of punches against planned shifts.
///
/// Every date carrying a punch or a plan appears in the result, in
/// chronological order. Returns the per-day rows plus the month aggregate.
pub fn reconcile_month(
    punches: &BTreeMap<NaiveDate, PunchRecord>,
    shifts: &BTreeMap<NaiveDate, ShiftPlan>,
    grace_period_minutes: i64,
    hourly_rate: i64,
) -> (Vec<DayReconciliation>, MonthlySummary) {
    let mut dates: Vec<NaiveDate> = punches.keys().chain(shifts.keys()).copied().collect();
    dates.sort_unstable();
    dates.dedup();

    let mut days = Vec::with_capacity(dates.len());
    let mut total_payable_minutes = 0i64;
    let mut worked_day_count = 0u32;

    for date in dates {
        let punch = punches.get(&date);
        let plan = shifts.get(&date);

        let mut payable_minutes = 0i64;

        let status = match (punch, plan) {
            (None, Some(_)) => DayStatus::ScheduledOnly,
            (Some(p), _) if p.clock_out.is_none() => DayStatus::InProgress,
            (Some(p), plan) => {
                worked_day_count += 1;
                let clock_out = p.clock_out.unwrap();

                let on_time = plan.is_some_and(|plan| {
                    let (start, end) = shift_bounds(date, plan);
                    within_grace(p.clock_in, start, grace_period_minutes)
                        && within_grace(clock_out, end, grace_period_minutes)
                });

                if on_time {
                    let (start, end) = shift_bounds(date, plan.unwrap());
                    let scheduled = (end - start).num_minutes();
                    if scheduled > 0 {
                        payable_minutes = scheduled;
                        total_payable_minutes += scheduled;
                    }
                    DayStatus::OnTime
                } else {
                    DayStatus::Worked
                }
            }
            (None, None) => unreachable!("dates come from the two maps"),
        };

        days.push(DayReconciliation {
            date,
            clock_in: punch.map(|p| p.clock_in),
            clock_out: punch.and_then(|p| p.clock_out),
            scheduled_start: plan.map(|s| s.start_time),
            scheduled_end: plan.map(|s| s.end_time),
            status,
            payable_minutes,
        });
    }

    let summary = summarize(total_payable_minutes, worked_day_count, hourly_rate);
    (days, summary)
}

/// Whole hours pay at the full rate; the remainder minutes are converted to
/// a fractional-hour wage and rounded half-up on their own. The split can
/// differ by one unit from rounding the grand total at once, and that is
/// the established payout behavior, so it stays.
fn summarize(total_payable_minutes: i64, worked_day_count: u32, hourly_rate: i64) -> MonthlySummary {
    let hours = total_payable_minutes / 60;
    let minutes = total_payable_minutes % 60;

    let estimated_wage = hours * hourly_rate + ((minutes * hourly_rate) as f64 / 60.0).round() as i64;

    MonthlySummary {
        total_payable_minutes,
        worked_day_count,
        estimated_wage,
        total_payable_label: format!("{}시간 {}분", hours, minutes),
        estimated_wage_label: format_currency(estimated_wage),
    }
}

/// Thousands separators, e.g. `99000` -> `"99,000"`.
pub fn format_currency(amount: i64) -> String {
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn dt(y: i32, m: u32, day: u32, h: u32, min: u32) -> NaiveDateTime {
        d(y, m, day).and_hms_opt(h, min, 0).unwrap()
    }

    fn t(h: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, min, 0).unwrap()
    }

    fn punch(date: (i32, u32, u32), in_hm: (u32, u32), out_hm: Option<(u32, u32)>) -> PunchRecord {
        PunchRecord {
            id: 1,
            clock_in: dt(date.0, date.1, date.2, in_hm.0, in_hm.1),
            clock_out: out_hm.map(|(h, m)| dt(date.0, date.1, date.2, h, m)),
        }
    }

    fn plan(start: (u32, u32), end: (u32, u32)) -> ShiftPlan {
        ShiftPlan {
            start_time: t(start.0, start.1),
            end_time: t(end.0, end.1),
        }
    }

    #[test]
    fn empty_month_is_all_zero() {
        let (days, summary) = reconcile_month(&BTreeMap::new(), &BTreeMap::new(), 15, 11000);
        assert!(days.is_empty());
        assert_eq!(summary.total_payable_minutes, 0);
        assert_eq!(summary.worked_day_count, 0);
        assert_eq!(summary.estimated_wage, 0);
        assert_eq!(summary.total_payable_label, "0시간 0분");
        assert_eq!(summary.estimated_wage_label, "0");
    }

    #[test]
    fn exact_punches_are_valid_even_with_zero_grace() {
        let date = d(2024, 3, 4);
        let punches = BTreeMap::from([(date, punch((2024, 3, 4), (9, 0), Some((18, 0))))]);
        let shifts = BTreeMap::from([(date, plan((9, 0), (18, 0)))]);

        let (days, summary) = reconcile_month(&punches, &shifts, 0, 11000);
        assert_eq!(days[0].status, DayStatus::OnTime);
        assert_eq!(summary.total_payable_minutes, 540);
    }

    #[test]
    fn in_tolerance_day_credits_scheduled_duration() {
        let date = d(2024, 3, 4);
        let punches = BTreeMap::from([(date, punch((2024, 3, 4), (9, 5), Some((18, 10))))]);
        let shifts = BTreeMap::from([(date, plan((9, 0), (18, 0)))]);

        let (days, summary) = reconcile_month(&punches, &shifts, 15, 11000);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].status, DayStatus::OnTime);
        assert_eq!(days[0].payable_minutes, 540);
        assert_eq!(summary.total_payable_minutes, 540);
        assert_eq!(summary.worked_day_count, 1);
        assert_eq!(summary.estimated_wage, 99_000);
        assert_eq!(summary.total_payable_label, "9시간 0분");
        assert_eq!(summary.estimated_wage_label, "99,000");
    }

    #[test]
    fn late_clock_in_still_counts_as_worked_day_but_pays_nothing() {
        let date = d(2024, 3, 4);
        let punches = BTreeMap::from([(date, punch((2024, 3, 4), (9, 20), Some((18, 0))))]);
        let shifts = BTreeMap::from([(date, plan((9, 0), (18, 0)))]);

        let (days, summary) = reconcile_month(&punches, &shifts, 15, 11000);
        assert_eq!(days[0].status, DayStatus::Worked);
        assert_eq!(days[0].payable_minutes, 0);
        assert_eq!(summary.total_payable_minutes, 0);
        assert_eq!(summary.worked_day_count, 1);
    }

    #[test]
    fn grace_window_bounds_are_inclusive() {
        let date = d(2024, 3, 4);
        let shifts = BTreeMap::from([(date, plan((9, 0), (18, 0)))]);

        // Exactly 15 minutes early: valid.
        let punches = BTreeMap::from([(date, punch((2024, 3, 4), (8, 45), Some((18, 0))))]);
        let (days, _) = reconcile_month(&punches, &shifts, 15, 11000);
        assert_eq!(days[0].status, DayStatus::OnTime);

        // One minute more: invalid.
        let punches = BTreeMap::from([(date, punch((2024, 3, 4), (8, 44), Some((18, 0))))]);
        let (days, _) = reconcile_month(&punches, &shifts, 15, 11000);
        assert_eq!(days[0].status, DayStatus::Worked);
    }

    #[test]
    fn seconds_outside_the_grace_window_are_out_of_tolerance() {
        let date = d(2024, 3, 4);
        let shifts = BTreeMap::from([(date, plan((9, 0), (18, 0)))]);

        // 08:44:01 is 15 minutes 59 seconds early, just past the window.
        let punches = BTreeMap::from([(
            date,
            PunchRecord {
                id: 1,
                clock_in: d(2024, 3, 4).and_hms_opt(8, 44, 1).unwrap(),
                clock_out: Some(dt(2024, 3, 4, 18, 0)),
            },
        )]);
        let (days, summary) = reconcile_month(&punches, &shifts, 15, 11000);
        assert_eq!(days[0].status, DayStatus::Worked);
        assert_eq!(summary.total_payable_minutes, 0);

        // 18:15:30 out is equally out of tolerance on the far side.
        let punches = BTreeMap::from([(
            date,
            PunchRecord {
                id: 1,
                clock_in: dt(2024, 3, 4, 9, 0),
                clock_out: Some(d(2024, 3, 4).and_hms_opt(18, 15, 30).unwrap()),
            },
        )]);
        let (days, _) = reconcile_month(&punches, &shifts, 15, 11000);
        assert_eq!(days[0].status, DayStatus::Worked);

        // A few seconds inside the boundary still passes.
        let punches = BTreeMap::from([(
            date,
            PunchRecord {
                id: 1,
                clock_in: d(2024, 3, 4).and_hms_opt(8, 45, 30).unwrap(),
                clock_out: Some(dt(2024, 3, 4, 18, 0)),
            },
        )]);
        let (days, _) = reconcile_month(&punches, &shifts, 15, 11000);
        assert_eq!(days[0].status, DayStatus::OnTime);
    }

    #[test]
    fn overnight_shift_end_lands_on_next_day() {
        let date = d(2024, 3, 4);
        let punches = BTreeMap::from([(
            date,
            PunchRecord {
                id: 1,
                clock_in: dt(2024, 3, 4, 22, 0),
                clock_out: Some(dt(2024, 3, 5, 6, 5)),
            },
        )]);
        let shifts = BTreeMap::from([(date, plan((22, 0), (6, 0)))]);

        let (days, summary) = reconcile_month(&punches, &shifts, 15, 11000);
        assert_eq!(days[0].status, DayStatus::OnTime);
        assert_eq!(days[0].payable_minutes, 480);
        assert_eq!(summary.total_payable_minutes, 480);
    }

    #[test]
    fn clock_in_only_is_in_progress_and_not_a_worked_day() {
        let date = d(2024, 3, 4);
        let punches = BTreeMap::from([(date, punch((2024, 3, 4), (9, 0), None))]);
        let shifts = BTreeMap::from([(date, plan((9, 0), (18, 0)))]);

        let (days, summary) = reconcile_month(&punches, &shifts, 15, 11000);
        assert_eq!(days[0].status, DayStatus::InProgress);
        assert_eq!(summary.worked_day_count, 0);
        assert_eq!(summary.total_payable_minutes, 0);
    }

    #[test]
    fn scheduled_day_without_punches_appears_in_results() {
        let date = d(2024, 3, 4);
        let shifts = BTreeMap::from([(date, plan((9, 0), (18, 0)))]);

        let (days, summary) = reconcile_month(&BTreeMap::new(), &shifts, 15, 11000);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].status, DayStatus::ScheduledOnly);
        assert_eq!(days[0].clock_in, None);
        assert_eq!(summary.worked_day_count, 0);
    }

    #[test]
    fn worked_day_without_schedule_pays_nothing() {
        let date = d(2024, 3, 4);
        let punches = BTreeMap::from([(date, punch((2024, 3, 4), (9, 0), Some((18, 0))))]);

        let (days, summary) = reconcile_month(&punches, &BTreeMap::new(), 15, 11000);
        assert_eq!(days[0].status, DayStatus::Worked);
        assert_eq!(summary.worked_day_count, 1);
        assert_eq!(summary.total_payable_minutes, 0);
    }

    #[test]
    fn days_come_back_in_chronological_order() {
        let punches = BTreeMap::from([
            (d(2024, 3, 20), punch((2024, 3, 20), (9, 0), Some((18, 0)))),
            (d(2024, 3, 4), punch((2024, 3, 4), (9, 0), Some((18, 0)))),
        ]);
        let shifts = BTreeMap::from([(d(2024, 3, 12), plan((9, 0), (18, 0)))]);

        let (days, _) = reconcile_month(&punches, &shifts, 15, 11000);
        let dates: Vec<NaiveDate> = days.iter().map(|day| day.date).collect();
        assert_eq!(dates, vec![d(2024, 3, 4), d(2024, 3, 12), d(2024, 3, 20)]);
    }

    #[test]
    fn reconciliation_is_deterministic() {
        let date = d(2024, 3, 4);
        let punches = BTreeMap::from([(date, punch((2024, 3, 4), (9, 5), Some((18, 10))))]);
        let shifts = BTreeMap::from([(date, plan((9, 0), (18, 0)))]);

        let first = reconcile_month(&punches, &shifts, 15, 11000);
        let second = reconcile_month(&punches, &shifts, 15, 11000);
        assert_eq!(first.1, second.1);
        assert_eq!(first.0.len(), second.0.len());
    }

    #[test]
    fn duplicate_rows_for_a_date_keep_the_latest_clock_in() {
        let rows = vec![
            AttendanceRow {
                id: 1,
                clock_in_time: Some(dt(2024, 3, 4, 9, 0)),
                clock_out_time: Some(dt(2024, 3, 4, 12, 0)),
            },
            AttendanceRow {
                id: 2,
                clock_in_time: Some(dt(2024, 3, 4, 14, 0)),
                clock_out_time: None,
            },
        ];

        let punches = bucket_punches(rows);
        assert_eq!(punches.len(), 1);
        let record = &punches[&d(2024, 3, 4)];
        assert_eq!(record.id, 2);
        assert_eq!(record.clock_in, dt(2024, 3, 4, 14, 0));
    }

    #[test]
    fn rows_without_clock_in_are_dropped() {
        let rows = vec![AttendanceRow {
            id: 1,
            clock_in_time: None,
            clock_out_time: Some(dt(2024, 3, 4, 18, 0)),
        }];
        assert!(bucket_punches(rows).is_empty());
    }

    #[test]
    fn wage_splits_whole_hours_from_rounded_remainder() {
        // 90 minutes at 11,000/h: 11,000 + round(30/60 * 11,000) = 16,500.
        let summary = summarize(90, 1, 11000);
        assert_eq!(summary.estimated_wage, 16_500);
        assert_eq!(summary.total_payable_label, "1시간 30분");

        // 61 minutes at 99/h: 99 + round(99/60) = 99 + 2 = 101. Rounding the
        // grand total at once would give 100.
        let summary = summarize(61, 1, 99);
        assert_eq!(summary.estimated_wage, 101);
    }

    #[test]
    fn parses_both_time_forms() {
        assert_eq!(parse_time_of_day("09:00"), Some(t(9, 0)));
        assert_eq!(parse_time_of_day("09:00:30"), NaiveTime::from_hms_opt(9, 0, 30));
        assert_eq!(parse_time_of_day("9am"), None);
        assert_eq!(parse_time_of_day("25:00"), None);
    }

    #[test]
    fn month_bounds_handle_year_edges() {
        assert_eq!(
            month_bounds(2024, 12),
            Some((d(2024, 12, 1), d(2024, 12, 31)))
        );
        assert_eq!(month_bounds(2024, 2), Some((d(2024, 2, 1), d(2024, 2, 29))));
        assert_eq!(month_bounds(2023, 2), Some((d(2023, 2, 1), d(2023, 2, 28))));
        assert_eq!(month_bounds(2024, 13), None);
    }

    #[test]
    fn currency_grouping() {
        assert_eq!(format_currency(0), "0");
        assert_eq!(format_currency(999), "999");
        assert_eq!(format_currency(99_000), "99,000");
        assert_eq!(format_currency(1_234_567), "1,234,567");
        assert_eq!(format_currency(-99_000), "-99,000");
    }
}
