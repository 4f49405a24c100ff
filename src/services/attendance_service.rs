// src/services/attendance_service.rs
use crate::{
    error::{AppError, AppResult},
    models::attendance::{
        AttendanceRecord, DailySummary, NewAttendance, NewAttendanceBatch, SessionSummary,
        TimeRange,
    },
    services::ensure_present,
};
use chrono::{Days, NaiveDate, NaiveDateTime};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

const RECORD_COLUMNS: &str =
    "id, student_name, student_roll, dept, class_name, subject, is_present, created_at";

/// Session key: the record timestamp truncated to the second.
const SESSION_KEY: &str = "strftime('%Y-%m-%d %H:%M:%S', created_at)";

/// Number of calendar days in the weekly summary, today included.
pub const WEEK_DAYS: u64 = 7;

/// Default K for the last-sessions report.
pub const DEFAULT_SESSION_LIMIT: i64 = 7;

async fn insert_record(conn: &mut SqliteConnection, record: &AttendanceRecord) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO attendance_records
            (id, student_name, student_roll, dept, class_name, subject, is_present, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&record.id)
    .bind(&record.student_name)
    .bind(&record.student_roll)
    .bind(&record.dept)
    .bind(&record.class_name)
    .bind(&record.subject)
    .bind(record.is_present)
    .bind(record.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Stores one attendance record; `created_at` defaults to `now`.
pub async fn record_attendance(
    db_pool: &SqlitePool,
    new: NewAttendance,
    now: NaiveDateTime,
) -> AppResult<AttendanceRecord> {
    ensure_present(&[
        ("studentName", new.student_name.as_str()),
        ("studentRoll", new.student_roll.as_str()),
        ("dept", new.dept.as_str()),
        ("className", new.class_name.as_str()),
        ("subject", new.subject.as_str()),
    ])?;

    let record = AttendanceRecord {
        id: Uuid::new_v4().to_string(),
        student_name: new.student_name,
        student_roll: new.student_roll,
        dept: new.dept,
        class_name: new.class_name,
        subject: new.subject,
        is_present: new.is_present,
        created_at: new.created_at.unwrap_or(now),
    };

    let mut conn = db_pool.acquire().await?;
    insert_record(&mut *conn, &record).await?;

    tracing::info!(
        "Attendance recorded for roll {} in {} ({})",
        record.student_roll,
        record.subject,
        if record.is_present { "present" } else { "absent" }
    );
    Ok(record)
}

/// Stores one record per entry of the batch in a single transaction. Each
/// entry without `createdAt` gets `now`.
pub async fn record_attendance_bulk(
    db_pool: &SqlitePool,
    batch: NewAttendanceBatch,
    now: NaiveDateTime,
) -> AppResult<Vec<AttendanceRecord>> {
    if batch.attendance_records.is_empty() {
        return Err(AppError::InvalidInput(
            "attendanceRecords must be a non-empty array".to_string(),
        ));
    }
    ensure_present(&[
        ("studentName", batch.student_name.as_str()),
        ("studentRoll", batch.student_roll.as_str()),
        ("dept", batch.dept.as_str()),
        ("className", batch.class_name.as_str()),
        ("subject", batch.subject.as_str()),
    ])?;

    let records: Vec<AttendanceRecord> = batch
        .attendance_records
        .iter()
        .map(|entry| AttendanceRecord {
            id: Uuid::new_v4().to_string(),
            student_name: batch.student_name.clone(),
            student_roll: batch.student_roll.clone(),
            dept: batch.dept.clone(),
            class_name: batch.class_name.clone(),
            subject: batch.subject.clone(),
            is_present: entry.is_present,
            created_at: entry.created_at.unwrap_or(now),
        })
        .collect();

    let mut tx = db_pool.begin().await?;
    for record in &records {
        insert_record(&mut *tx, record).await?;
    }
    tx.commit().await?;

    tracing::info!(
        "{} attendance records added for roll {} in {}",
        records.len(),
        batch.student_roll,
        batch.subject
    );
    Ok(records)
}

pub async fn find_all(db_pool: &SqlitePool) -> AppResult<Vec<AttendanceRecord>> {
    let sql = format!(
        "SELECT {} FROM attendance_records ORDER BY created_at ASC",
        RECORD_COLUMNS
    );
    let records = sqlx::query_as::<_, AttendanceRecord>(&sql)
        .fetch_all(db_pool)
        .await?;
    tracing::debug!("Loaded {} attendance records.", records.len());
    Ok(records)
}

/// Records of one student in one subject inside `range`.
pub async fn find_for_student(
    db_pool: &SqlitePool,
    subject: &str,
    student_roll: &str,
    range: TimeRange,
) -> AppResult<Vec<AttendanceRecord>> {
    tracing::debug!(
        "Attendance lookup for roll {} in {} within {:?}",
        student_roll,
        subject,
        range
    );
    let sql = format!(
        r#"
        SELECT {}
        FROM attendance_records
        WHERE subject = ?1 AND student_roll = ?2
          AND (?3 IS NULL OR created_at >= ?3)
          AND (?4 IS NULL OR created_at <= ?4)
        ORDER BY created_at ASC
        "#,
        RECORD_COLUMNS
    );
    let records = sqlx::query_as::<_, AttendanceRecord>(&sql)
        .bind(subject)
        .bind(student_roll)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(db_pool)
        .await?;
    Ok(records)
}

/// Records of a whole class for one subject inside `range`.
pub async fn find_for_class(
    db_pool: &SqlitePool,
    dept: &str,
    class_name: &str,
    subject: &str,
    range: TimeRange,
) -> AppResult<Vec<AttendanceRecord>> {
    tracing::debug!(
        "Attendance lookup for class {}/{} in {} within {:?}",
        dept,
        class_name,
        subject,
        range
    );
    let sql = format!(
        r#"
        SELECT {}
        FROM attendance_records
        WHERE dept = ?1 AND class_name = ?2 AND subject = ?3
          AND (?4 IS NULL OR created_at >= ?4)
          AND (?5 IS NULL OR created_at <= ?5)
        ORDER BY created_at ASC
        "#,
        RECORD_COLUMNS
    );
    let records = sqlx::query_as::<_, AttendanceRecord>(&sql)
        .bind(dept)
        .bind(class_name)
        .bind(subject)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(db_pool)
        .await?;
    Ok(records)
}

/// Present/absent totals per calendar date for the seven days ending `today`,
/// oldest first. Dates without records are reported as zeros.
pub async fn weekly_summary(
    db_pool: &SqlitePool,
    dept: &str,
    class_name: &str,
    subject: &str,
    today: NaiveDate,
) -> AppResult<Vec<DailySummary>> {
    let first_day = week_start(today);
    let range = TimeRange {
        start: TimeRange::whole_day(first_day).start,
        end: TimeRange::whole_day(today).end,
    };

    let rows = sqlx::query_as::<_, DailySummary>(
        r#"
        SELECT
            date(created_at) AS date,
            SUM(CASE WHEN is_present THEN 1 ELSE 0 END) AS students_present,
            SUM(CASE WHEN is_present THEN 0 ELSE 1 END) AS students_absent
        FROM attendance_records
        WHERE dept = ?1 AND class_name = ?2 AND subject = ?3
          AND created_at >= ?4 AND created_at <= ?5
        GROUP BY date(created_at)
        ORDER BY date ASC
        "#,
    )
    .bind(dept)
    .bind(class_name)
    .bind(subject)
    .bind(range.start)
    .bind(range.end)
    .fetch_all(db_pool)
    .await?;

    tracing::debug!(
        "Weekly summary for {}/{} in {}: {} active day(s)",
        dept,
        class_name,
        subject,
        rows.len()
    );
    Ok(fill_week(today, &rows))
}

fn week_start(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_days(Days::new(WEEK_DAYS - 1))
        .unwrap_or(today)
}

/// Expands grouped rows into exactly seven contiguous dates ending `today`.
pub fn fill_week(today: NaiveDate, rows: &[DailySummary]) -> Vec<DailySummary> {
    week_start(today)
        .iter_days()
        .take(WEEK_DAYS as usize)
        .map(|date| {
            rows.iter()
                .find(|row| row.date == date)
                .cloned()
                .unwrap_or(DailySummary {
                    date,
                    students_present: 0,
                    students_absent: 0,
                })
        })
        .collect()
}

/// Tallies of the latest `limit` attendance-taking events (distinct
/// timestamps to the second), returned oldest first.
pub async fn last_sessions(
    db_pool: &SqlitePool,
    dept: &str,
    class_name: &str,
    subject: &str,
    limit: i64,
) -> AppResult<Vec<SessionSummary>> {
    if limit < 1 {
        return Err(AppError::InvalidInput(
            "limit must be a positive number".to_string(),
        ));
    }

    let sql = format!(
        r#"
        SELECT
            {key} AS session_time,
            SUM(CASE WHEN is_present THEN 1 ELSE 0 END) AS students_present,
            SUM(CASE WHEN is_present THEN 0 ELSE 1 END) AS students_absent
        FROM attendance_records
        WHERE dept = ?1 AND class_name = ?2 AND subject = ?3
        GROUP BY {key}
        ORDER BY session_time DESC
        LIMIT ?4
        "#,
        key = SESSION_KEY
    );
    let mut sessions = sqlx::query_as::<_, SessionSummary>(&sql)
        .bind(dept)
        .bind(class_name)
        .bind(subject)
        .bind(limit)
        .fetch_all(db_pool)
        .await?;
    sessions.reverse();

    tracing::debug!(
        "Last {} session(s) for {}/{} in {}",
        sessions.len(),
        dept,
        class_name,
        subject
    );
    Ok(sessions)
}

/// Number of distinct attendance-taking events held for a class subject.
pub async fn total_class_count(
    db_pool: &SqlitePool,
    dept: &str,
    class_name: &str,
    subject: &str,
) -> AppResult<i64> {
    let sql = format!(
        r#"
        SELECT COUNT(*) FROM (
            SELECT 1
            FROM attendance_records
            WHERE dept = ?1 AND class_name = ?2 AND subject = ?3
            GROUP BY {}
        )
        "#,
        SESSION_KEY
    );
    let total: i64 = sqlx::query_scalar(&sql)
        .bind(dept)
        .bind(class_name)
        .bind(subject)
        .fetch_one(db_pool)
        .await?;
    Ok(total)
}

pub async fn delete_all(db_pool: &SqlitePool) -> AppResult<u64> {
    let deleted = sqlx::query("DELETE FROM attendance_records")
        .execute(db_pool)
        .await?
        .rows_affected();
    tracing::warn!("Deleted all attendance records ({}).", deleted);
    Ok(deleted)
}
