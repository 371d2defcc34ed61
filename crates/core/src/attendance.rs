//! Attendance evaluation against the office work schedule.
//!
//! Timestamps are stored in UTC; the office day is evaluated in local time
//! using the schedule's fixed UTC offset, so a check-in at 01:30 UTC is
//! 08:30 on the same local day at UTC+7.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use serde::Serialize;

use crate::define_str_enum;
use crate::error::CoreError;
use crate::types::Timestamp;

/// A second punch closer than this to the first is treated as a duplicate
/// scan rather than a check-out.
pub const MIN_CHECKOUT_GAP_MINS: i64 = 30;

define_str_enum! {
    /// Daily attendance outcome for one employee.
    AttendanceStatus {
        Present = "present",
        Late = "late",
        Absent = "absent",
        OnLeave = "on_leave",
        Holiday = "holiday",
    }
}

define_str_enum! {
    /// Where an attendance record came from.
    AttendanceSource {
        Machine = "machine",
        Web = "web",
        Manual = "manual",
        System = "system",
    }
}

/// Office hours used to classify check-ins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkSchedule {
    pub start: NaiveTime,
    pub end: NaiveTime,
    /// Minutes after `start` during which a check-in still counts as present.
    pub late_grace_mins: i64,
    /// Offset of office local time from UTC, in minutes.
    pub utc_offset_mins: i32,
}

impl Default for WorkSchedule {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
            late_grace_mins: 15,
            utc_offset_mins: 7 * 60,
        }
    }
}

impl WorkSchedule {
    /// Build a schedule, rejecting impossible combinations.
    pub fn new(
        start: NaiveTime,
        end: NaiveTime,
        late_grace_mins: i64,
        utc_offset_mins: i32,
    ) -> Result<Self, CoreError> {
        if end <= start {
            return Err(CoreError::Validation(format!(
                "Work end {end} must be after work start {start}"
            )));
        }
        if late_grace_mins < 0 {
            return Err(CoreError::Validation(
                "Late grace period cannot be negative".to_string(),
            ));
        }
        if chrono::FixedOffset::east_opt(utc_offset_mins * 60).is_none() {
            return Err(CoreError::Validation(format!(
                "UTC offset of {utc_offset_mins} minutes is out of range"
            )));
        }
        Ok(Self {
            start,
            end,
            late_grace_mins,
            utc_offset_mins,
        })
    }

    pub fn offset(&self) -> chrono::FixedOffset {
        chrono::FixedOffset::east_opt(self.utc_offset_mins * 60).unwrap_or_else(|| Utc.fix())
    }

    pub fn to_local(&self, ts: Timestamp) -> NaiveDateTime {
        ts.with_timezone(&self.offset()).naive_local()
    }

    /// Local calendar date of a UTC timestamp.
    pub fn local_date(&self, ts: Timestamp) -> NaiveDate {
        self.to_local(ts).date()
    }

    /// Interpret a device-local wall-clock time as a UTC timestamp.
    pub fn from_local(&self, local: NaiveDateTime) -> Timestamp {
        match self.offset().from_local_datetime(&local).single() {
            Some(dt) => dt.with_timezone(&Utc),
            None => DateTime::from_naive_utc_and_offset(local, Utc),
        }
    }
}

/// Result of classifying a check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckInEvaluation {
    pub status: AttendanceStatus,
    /// Minutes after schedule start; zero unless the check-in is late.
    pub late_minutes: i32,
}

/// Classify a check-in at local time `local` as present or late.
pub fn evaluate_check_in(schedule: &WorkSchedule, local: NaiveTime) -> CheckInEvaluation {
    let minutes_after_start = (local - schedule.start).num_minutes();
    if minutes_after_start > schedule.late_grace_mins {
        CheckInEvaluation {
            status: AttendanceStatus::Late,
            late_minutes: minutes_after_start as i32,
        }
    } else {
        CheckInEvaluation {
            status: AttendanceStatus::Present,
            late_minutes: 0,
        }
    }
}

/// Minutes worked between check-in and check-out; never negative.
pub fn work_minutes(check_in: Timestamp, check_out: Timestamp) -> i32 {
    (check_out - check_in).num_minutes().max(0) as i32
}

/// First and last punch of one local day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyPunches {
    pub date: NaiveDate,
    pub check_in: Timestamp,
    pub check_out: Option<Timestamp>,
}

/// Group raw punches by local date.
///
/// The earliest punch of a day is the check-in. The latest punch becomes the
/// check-out only when it is at least [`MIN_CHECKOUT_GAP_MINS`] later.
pub fn fold_punches(schedule: &WorkSchedule, punches: &[Timestamp]) -> Vec<DailyPunches> {
    let mut by_day: BTreeMap<NaiveDate, (Timestamp, Timestamp)> = BTreeMap::new();
    for &punch in punches {
        let date = schedule.local_date(punch);
        by_day
            .entry(date)
            .and_modify(|(first, last)| {
                if punch < *first {
                    *first = punch;
                }
                if punch > *last {
                    *last = punch;
                }
            })
            .or_insert((punch, punch));
    }

    by_day
        .into_iter()
        .map(|(date, (first, last))| {
            let check_out =
                ((last - first).num_minutes() >= MIN_CHECKOUT_GAP_MINS).then_some(last);
            DailyPunches {
                date,
                check_in: first,
                check_out,
            }
        })
        .collect()
}

/// A fully evaluated attendance day ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRecord {
    pub work_date: NaiveDate,
    pub check_in: Timestamp,
    pub check_out: Option<Timestamp>,
    pub status: AttendanceStatus,
    pub late_minutes: i32,
    pub work_minutes: i32,
}

/// Evaluate one day of punches against the schedule.
pub fn evaluate_day(schedule: &WorkSchedule, day: &DailyPunches) -> DayRecord {
    let eval = evaluate_check_in(schedule, schedule.to_local(day.check_in).time());
    DayRecord {
        work_date: day.date,
        check_in: day.check_in,
        check_out: day.check_out,
        status: eval.status,
        late_minutes: eval.late_minutes,
        work_minutes: day
            .check_out
            .map(|out| work_minutes(day.check_in, out))
            .unwrap_or(0),
    }
}

/// Per-day figures fed into [`summarize`].
#[derive(Debug, Clone, Copy)]
pub struct DayTotals {
    pub status: AttendanceStatus,
    pub late_minutes: i32,
    pub work_minutes: i32,
}

/// Aggregated attendance over a period (typically a month).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceSummary {
    pub days_recorded: i32,
    pub present: i32,
    pub late: i32,
    pub absent: i32,
    pub on_leave: i32,
    pub holiday: i32,
    pub total_work_minutes: i64,
    pub total_late_minutes: i64,
}

pub fn summarize(days: impl IntoIterator<Item = DayTotals>) -> AttendanceSummary {
    let mut summary = AttendanceSummary::default();
    for day in days {
        summary.days_recorded += 1;
        match day.status {
            AttendanceStatus::Present => summary.present += 1,
            AttendanceStatus::Late => summary.late += 1,
            AttendanceStatus::Absent => summary.absent += 1,
            AttendanceStatus::OnLeave => summary.on_leave += 1,
            AttendanceStatus::Holiday => summary.holiday += 1,
        }
        summary.total_work_minutes += i64::from(day.work_minutes);
        summary.total_late_minutes += i64::from(day.late_minutes);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn utc(day: u32, h: u32, m: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2026, 10, day, h, m, 0).unwrap()
    }

    #[test]
    fn on_time_and_within_grace_is_present() {
        let s = WorkSchedule::default();
        assert_eq!(evaluate_check_in(&s, t(7, 45)).status, AttendanceStatus::Present);
        let within = evaluate_check_in(&s, t(8, 15));
        assert_eq!(within.status, AttendanceStatus::Present);
        assert_eq!(within.late_minutes, 0);
    }

    #[test]
    fn beyond_grace_is_late_counted_from_start() {
        let s = WorkSchedule::default();
        let eval = evaluate_check_in(&s, t(8, 40));
        assert_eq!(eval.status, AttendanceStatus::Late);
        assert_eq!(eval.late_minutes, 40);
    }

    #[test]
    fn schedule_rejects_inverted_hours() {
        assert!(WorkSchedule::new(t(17, 0), t(8, 0), 15, 420).is_err());
        assert!(WorkSchedule::new(t(8, 0), t(17, 0), -1, 420).is_err());
        assert!(WorkSchedule::new(t(8, 0), t(17, 0), 15, 420).is_ok());
    }

    #[test]
    fn local_date_uses_offset() {
        let s = WorkSchedule::default();
        // 18:30 UTC on the 15th is 01:30 on the 16th at UTC+7.
        assert_eq!(
            s.local_date(utc(15, 18, 30)),
            NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
        );
    }

    #[test]
    fn from_local_round_trips() {
        let s = WorkSchedule::default();
        let local = NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(8, 5, 0)
            .unwrap();
        let ts = s.from_local(local);
        assert_eq!(ts, utc(16, 1, 5));
        assert_eq!(s.to_local(ts), local);
    }

    #[test]
    fn fold_picks_first_and_last_punch_per_day() {
        let s = WorkSchedule::default();
        // Local 08:05, 12:00, 17:10 on the 16th.
        let punches = [utc(16, 5, 0), utc(16, 1, 5), utc(16, 10, 10)];
        let days = fold_punches(&s, &punches);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].check_in, utc(16, 1, 5));
        assert_eq!(days[0].check_out, Some(utc(16, 10, 10)));
    }

    #[test]
    fn double_scan_is_not_a_checkout() {
        let s = WorkSchedule::default();
        let punches = [utc(16, 1, 5), utc(16, 1, 6)];
        let days = fold_punches(&s, &punches);
        assert_eq!(days[0].check_out, None);
    }

    #[test]
    fn fold_splits_days() {
        let s = WorkSchedule::default();
        let punches = [utc(15, 1, 0), utc(16, 1, 0)];
        let days = fold_punches(&s, &punches);
        assert_eq!(days.len(), 2);
        assert!(days[0].date < days[1].date);
    }

    #[test]
    fn evaluate_day_computes_minutes() {
        let s = WorkSchedule::default();
        let day = DailyPunches {
            date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            check_in: utc(16, 1, 45),   // 08:45 local
            check_out: Some(utc(16, 10, 0)), // 17:00 local
        };
        let record = evaluate_day(&s, &day);
        assert_eq!(record.status, AttendanceStatus::Late);
        assert_eq!(record.late_minutes, 45);
        assert_eq!(record.work_minutes, 8 * 60 + 15);
    }

    #[test]
    fn work_minutes_never_negative() {
        assert_eq!(work_minutes(utc(16, 10, 0), utc(16, 9, 0)), 0);
    }

    #[test]
    fn summary_counts_each_status() {
        let days = [
            DayTotals { status: AttendanceStatus::Present, late_minutes: 0, work_minutes: 480 },
            DayTotals { status: AttendanceStatus::Late, late_minutes: 30, work_minutes: 450 },
            DayTotals { status: AttendanceStatus::Absent, late_minutes: 0, work_minutes: 0 },
            DayTotals { status: AttendanceStatus::OnLeave, late_minutes: 0, work_minutes: 0 },
        ];
        let summary = summarize(days);
        assert_eq!(summary.days_recorded, 4);
        assert_eq!(summary.present, 1);
        assert_eq!(summary.late, 1);
        assert_eq!(summary.absent, 1);
        assert_eq!(summary.on_leave, 1);
        assert_eq!(summary.total_work_minutes, 930);
        assert_eq!(summary.total_late_minutes, 30);
    }
}
