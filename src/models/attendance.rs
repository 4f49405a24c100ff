// src/models/attendance.rs
use chrono::{DateTime, Days, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use std::str::FromStr;

/// One student's presence or absence for one subject session.
/// `created_at` is kept as a local wall-clock time so SQLite's `date()`
/// groups records by the school's calendar day.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub student_name: String,
    pub student_roll: String,
    pub dept: String,
    pub class_name: String,
    pub subject: String,
    pub is_present: bool,
    pub created_at: NaiveDateTime,
}

/// Body of `POST /attendance`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAttendance {
    pub student_name: String,
    pub student_roll: String,
    pub dept: String,
    pub class_name: String,
    pub subject: String,
    pub is_present: bool,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<NaiveDateTime>,
}

/// Body of `POST /attendance/multiple`: several days of attendance for the
/// same student and subject.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAttendanceBatch {
    pub student_name: String,
    pub student_roll: String,
    pub dept: String,
    pub class_name: String,
    pub subject: String,
    #[serde(alias = "records")]
    pub attendance_records: Vec<AttendanceEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    pub is_present: bool,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<NaiveDateTime>,
}

/// Accepts RFC 3339 (converted to local time), a naive `YYYY-MM-DDTHH:MM:SS`
/// or a bare `YYYY-MM-DD` (local midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid createdAt: {}", raw))),
    }
}

/// Inclusive time bounds; `None` leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl TimeRange {
    pub const UNBOUNDED: TimeRange = TimeRange {
        start: None,
        end: None,
    };

    /// `[00:00:00.000, 23:59:59.999]` of the given calendar day.
    pub fn whole_day(date: NaiveDate) -> Self {
        TimeRange {
            start: Some(date.and_time(NaiveTime::MIN)),
            end: date.and_hms_milli_opt(23, 59, 59, 999),
        }
    }

    /// From midnight `days` days before `now`'s date up to `now`.
    pub fn trailing_days(now: NaiveDateTime, days: u64) -> Self {
        let start = now
            .date()
            .checked_sub_days(Days::new(days))
            .map(|d| d.and_time(NaiveTime::MIN));
        TimeRange {
            start,
            end: Some(now),
        }
    }
}

/// Window of a per-student lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentWindow {
    Today,
    Last7Days,
    Last30Days,
    Total,
}

impl StudentWindow {
    pub fn range(self, now: NaiveDateTime) -> TimeRange {
        match self {
            StudentWindow::Today => TimeRange::whole_day(now.date()),
            StudentWindow::Last7Days => TimeRange::trailing_days(now, 7),
            StudentWindow::Last30Days => TimeRange::trailing_days(now, 30),
            StudentWindow::Total => TimeRange::UNBOUNDED,
        }
    }
}

impl FromStr for StudentWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(StudentWindow::Today),
            "last7days" | "lastweek" => Ok(StudentWindow::Last7Days),
            "last30days" => Ok(StudentWindow::Last30Days),
            "total" => Ok(StudentWindow::Total),
            other => Err(format!(
                "unknown window '{}', expected today, last7days, last30days or total",
                other
            )),
        }
    }
}

/// Class-wide reports under `/attendance/:dept/:className/:subject/...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassReport {
    Today,
    LastWeek,
    LastClasses,
}

impl FromStr for ClassReport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(ClassReport::Today),
            "lastweek" => Ok(ClassReport::LastWeek),
            "lastclasses" => Ok(ClassReport::LastClasses),
            other => Err(format!(
                "unknown report '{}', expected today, lastweek or lastclasses",
                other
            )),
        }
    }
}

/// Shape of a window query response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowView {
    #[default]
    Records,
    Count,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceCount {
    pub present: i64,
    pub absent: i64,
    pub total: i64,
}

impl AttendanceCount {
    pub fn from_records(records: &[AttendanceRecord]) -> Self {
        let present = records.iter().filter(|r| r.is_present).count() as i64;
        let total = records.len() as i64;
        AttendanceCount {
            present,
            absent: total - present,
            total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: NaiveDate,
    pub students_present: i64,
    pub students_absent: i64,
}

/// Tally of one attendance-taking event, keyed by its timestamp truncated to
/// the second.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_time: NaiveDateTime,
    pub students_present: i64,
    pub students_absent: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn today_covers_the_whole_calendar_day() {
        let range = StudentWindow::Today.range(at(2025, 4, 19, 14, 30));
        assert_eq!(range.start, Some(at(2025, 4, 19, 0, 0)));
        assert_eq!(
            range.end,
            NaiveDate::from_ymd_opt(2025, 4, 19)
                .unwrap()
                .and_hms_milli_opt(23, 59, 59, 999)
        );
    }

    #[test]
    fn trailing_windows_start_at_midnight_and_end_now() {
        let now = at(2025, 4, 19, 14, 30);
        let week = StudentWindow::Last7Days.range(now);
        assert_eq!(week.start, Some(at(2025, 4, 12, 0, 0)));
        assert_eq!(week.end, Some(now));

        let month = StudentWindow::Last30Days.range(now);
        assert_eq!(month.start, Some(at(2025, 3, 20, 0, 0)));

        assert_eq!(StudentWindow::Total.range(now), TimeRange::UNBOUNDED);
    }

    #[test]
    fn lastweek_is_an_alias_for_last7days() {
        assert_eq!("lastweek".parse::<StudentWindow>(), Ok(StudentWindow::Last7Days));
        assert_eq!("last7days".parse::<StudentWindow>(), Ok(StudentWindow::Last7Days));
        assert!("yesterday".parse::<StudentWindow>().is_err());
    }

    #[test]
    fn parses_the_timestamp_shapes_clients_send() {
        assert_eq!(
            parse_timestamp("2025-04-19T09:15:00"),
            Some(at(2025, 4, 19, 9, 15))
        );
        assert_eq!(parse_timestamp("2025-04-19"), Some(at(2025, 4, 19, 0, 0)));
        assert!(parse_timestamp("2025-04-19T09:15:00Z").is_some());
        assert_eq!(parse_timestamp("not a date"), None);
    }

    #[test]
    fn count_splits_present_and_absent() {
        let record = |is_present| AttendanceRecord {
            id: "x".into(),
            student_name: "Asha".into(),
            student_roll: "R1".into(),
            dept: "CS".into(),
            class_name: "3-A".into(),
            subject: "Math".into(),
            is_present,
            created_at: at(2025, 4, 19, 9, 0),
        };
        let count = AttendanceCount::from_records(&[record(true), record(false), record(true)]);
        assert_eq!(
            count,
            AttendanceCount {
                present: 2,
                absent: 1,
                total: 3
            }
        );
        assert_eq!(count.present + count.absent, count.total);
    }
}
