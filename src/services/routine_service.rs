// src/services/routine_service.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        routine::{NewSession, RoutineSession, SessionPatch},
        teacher::AssignedClass,
    },
    services::{required, teacher_service},
};
use chrono::{NaiveDate, Weekday};
use sqlx::{types::Json, SqlitePool};
use uuid::Uuid;

const SESSION_COLUMNS: &str = "id, teacher_id, day, department, semester, section, subject, \
                               start_time, end_time, status, last_updated";

/// Minutes since midnight for an "hh:mm AM/PM" time. 12 AM is midnight and
/// 12 PM is noon. Returns `None` for anything else.
pub fn clock_minutes(time: &str) -> Option<u32> {
    let (clock, meridiem) = time.trim().split_once(' ')?;
    let (hours, minutes) = clock.split_once(':')?;
    let hours: u32 = hours.trim().parse().ok()?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    if !(1..=12).contains(&hours) || minutes > 59 {
        return None;
    }

    let hours = match meridiem.trim().to_ascii_uppercase().as_str() {
        "AM" if hours == 12 => 0,
        "AM" => hours,
        "PM" if hours == 12 => 12,
        "PM" => hours + 12,
        _ => return None,
    };
    Some(hours * 60 + minutes)
}

/// Orders sessions by start time; unparsable times go last, keeping their
/// relative order.
pub fn sort_by_start_time(sessions: &mut [RoutineSession]) {
    sessions.sort_by_key(|s| {
        let minutes = clock_minutes(&s.start_time);
        (minutes.is_none(), minutes)
    });
}

/// Canonical full name ("Monday") for any spelling chrono accepts: full or
/// three-letter, any case. Sessions are stored and looked up by this name.
pub fn weekday_name(day: &str) -> AppResult<&'static str> {
    let weekday = day
        .trim()
        .parse::<Weekday>()
        .map_err(|_| AppError::InvalidInput(format!("'{}' is not a day of the week", day)))?;
    Ok(match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    })
}

/// Distinct subjects scheduled for a class.
pub async fn unique_subjects(
    db_pool: &SqlitePool,
    department: &str,
    semester: &str,
    section: &str,
) -> AppResult<Vec<String>> {
    let subjects: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT DISTINCT subject
        FROM routine_sessions
        WHERE department = ?1 AND semester = ?2 AND section = ?3
        ORDER BY subject ASC
        "#,
    )
    .bind(department)
    .bind(semester)
    .bind(section)
    .fetch_all(db_pool)
    .await?;

    if subjects.is_empty() {
        return Err(AppError::NotFound(
            "No subjects found for the specified parameters.".to_string(),
        ));
    }
    Ok(subjects)
}

/// A teacher's sessions for one day, time-sorted. Sessions last touched on an
/// earlier date get their status cleared and `last_updated` moved to `today`
/// first, so the reset happens once per day.
pub async fn day_routine(
    db_pool: &SqlitePool,
    teacher_id: &str,
    day: &str,
    today: NaiveDate,
) -> AppResult<Vec<RoutineSession>> {
    let day = weekday_name(day)?;
    let reset = sqlx::query(
        r#"
        UPDATE routine_sessions
        SET status = '[]', last_updated = ?1
        WHERE teacher_id = ?2 AND day = ?3
          AND (last_updated IS NULL OR last_updated <> ?1)
        "#,
    )
    .bind(today)
    .bind(teacher_id)
    .bind(day)
    .execute(db_pool)
    .await?
    .rows_affected();
    if reset > 0 {
        tracing::debug!(
            "Cleared stale status on {} session(s) of teacher {} for {}",
            reset,
            teacher_id,
            day
        );
    }

    let sql = format!(
        "SELECT {} FROM routine_sessions WHERE teacher_id = ?1 AND day = ?2",
        SESSION_COLUMNS
    );
    let mut sessions = sqlx::query_as::<_, RoutineSession>(&sql)
        .bind(teacher_id)
        .bind(day)
        .fetch_all(db_pool)
        .await?;

    if sessions.is_empty() {
        return Err(AppError::NotFound(
            "No routine found for this day".to_string(),
        ));
    }
    sort_by_start_time(&mut sessions);
    Ok(sessions)
}

/// Every teacher's sessions for one class on one day, time-sorted.
pub async fn class_routine(
    db_pool: &SqlitePool,
    department: &str,
    semester: &str,
    section: &str,
    day: &str,
) -> AppResult<Vec<RoutineSession>> {
    let day = weekday_name(day)?;
    let sql = format!(
        r#"
        SELECT {}
        FROM routine_sessions
        WHERE department = ?1 AND semester = ?2 AND section = ?3 AND day = ?4
        "#,
        SESSION_COLUMNS
    );
    let mut sessions = sqlx::query_as::<_, RoutineSession>(&sql)
        .bind(department)
        .bind(semester)
        .bind(section)
        .bind(day)
        .fetch_all(db_pool)
        .await?;

    if sessions.is_empty() {
        return Err(AppError::NotFound(
            "No sessions found for the specified parameters.".to_string(),
        ));
    }
    sort_by_start_time(&mut sessions);
    Ok(sessions)
}

pub async fn teacher_sessions(
    db_pool: &SqlitePool,
    teacher_id: &str,
) -> AppResult<Vec<RoutineSession>> {
    let sql = format!(
        "SELECT {} FROM routine_sessions WHERE teacher_id = ?1 ORDER BY rowid ASC",
        SESSION_COLUMNS
    );
    let sessions = sqlx::query_as::<_, RoutineSession>(&sql)
        .bind(teacher_id)
        .fetch_all(db_pool)
        .await?;

    if sessions.is_empty() {
        return Err(AppError::NotFound(
            "No sessions found for this teacher".to_string(),
        ));
    }
    tracing::debug!("Teacher {} has {} session(s).", teacher_id, sessions.len());
    Ok(sessions)
}

/// Schedules a new session and records the class among the teacher's
/// assignments. Both writes share one transaction.
pub async fn create_session(
    db_pool: &SqlitePool,
    teacher_id: &str,
    day: &str,
    new: NewSession,
) -> AppResult<RoutineSession> {
    let department = required("department", new.department)?;
    let semester = required("semester", new.semester)?;
    let section = required("section", new.section)?;
    let subject = required("subject", new.subject)?;
    let start_time = required("startTime", new.start_time)?;
    let end_time = required("endTime", new.end_time)?;
    let day = weekday_name(day)?;

    // Take the write lock up front: a deferred transaction that reads first
    // fails with SQLITE_BUSY instead of waiting when another writer holds it.
    let mut tx = db_pool.begin_with("BEGIN IMMEDIATE").await?;

    if !teacher_service::teacher_exists(&mut *tx, teacher_id).await? {
        tracing::warn!("Cannot create routine: teacher {} not found.", teacher_id);
        return Err(AppError::NotFound("Teacher not found.".to_string()));
    }

    let class = AssignedClass {
        department: department.clone(),
        class_name: format!("{}-{}", semester, section),
        subject: subject.clone(),
    };
    if teacher_service::assign_class(&mut *tx, teacher_id, &class).await? {
        tracing::info!(
            "Assigned {} {} {} to teacher {}",
            class.department,
            class.class_name,
            class.subject,
            teacher_id
        );
    }

    let session = RoutineSession {
        id: Uuid::new_v4().to_string(),
        teacher_id: teacher_id.to_string(),
        day: day.to_string(),
        department,
        semester,
        section,
        subject,
        start_time,
        end_time,
        status: Json(Vec::new()),
        last_updated: None,
    };

    sqlx::query(
        r#"
        INSERT INTO routine_sessions
            (id, teacher_id, day, department, semester, section, subject,
             start_time, end_time, status, last_updated)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&session.id)
    .bind(&session.teacher_id)
    .bind(&session.day)
    .bind(&session.department)
    .bind(&session.semester)
    .bind(&session.section)
    .bind(&session.subject)
    .bind(&session.start_time)
    .bind(&session.end_time)
    .bind(&session.status)
    .bind(session.last_updated)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        "Routine session {} created for teacher {} on {}",
        session.id,
        teacher_id,
        day
    );
    Ok(session)
}

/// Appends one status marker and stamps the session with `today`.
pub async fn append_status(
    db_pool: &SqlitePool,
    routine_id: &str,
    status: &str,
    today: NaiveDate,
) -> AppResult<RoutineSession> {
    let sql = format!(
        r#"
        UPDATE routine_sessions
        SET status = json_insert(status, '$[#]', ?1), last_updated = ?2
        WHERE id = ?3
        RETURNING {}
        "#,
        SESSION_COLUMNS
    );
    let session = sqlx::query_as::<_, RoutineSession>(&sql)
        .bind(status)
        .bind(today)
        .bind(routine_id)
        .fetch_optional(db_pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Routine Not Found.".to_string()))?;

    tracing::debug!("Status '{}' appended to session {}", status, routine_id);
    Ok(session)
}

/// Overwrites the supplied fields and stamps the session with `today`.
pub async fn update_session(
    db_pool: &SqlitePool,
    session_id: &str,
    patch: SessionPatch,
    today: NaiveDate,
) -> AppResult<RoutineSession> {
    let day = patch.day.as_deref().map(weekday_name).transpose()?;

    let sql = format!(
        r#"
        UPDATE routine_sessions
        SET day = COALESCE(?1, day),
            department = COALESCE(?2, department),
            semester = COALESCE(?3, semester),
            section = COALESCE(?4, section),
            subject = COALESCE(?5, subject),
            start_time = COALESCE(?6, start_time),
            end_time = COALESCE(?7, end_time),
            status = COALESCE(?8, status),
            last_updated = ?9
        WHERE id = ?10
        RETURNING {}
        "#,
        SESSION_COLUMNS
    );
    let session = sqlx::query_as::<_, RoutineSession>(&sql)
        .bind(day)
        .bind(patch.department)
        .bind(patch.semester)
        .bind(patch.section)
        .bind(patch.subject)
        .bind(patch.start_time)
        .bind(patch.end_time)
        .bind(patch.status.map(Json))
        .bind(today)
        .bind(session_id)
        .fetch_optional(db_pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;

    tracing::info!("Session {} updated.", session_id);
    Ok(session)
}

pub async fn delete_all(db_pool: &SqlitePool) -> AppResult<u64> {
    let deleted = sqlx::query("DELETE FROM routine_sessions")
        .execute(db_pool)
        .await?
        .rows_affected();
    tracing::warn!("Deleted all routine sessions ({}).", deleted);
    Ok(deleted)
}
