// src/web/attendance_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::attendance::{
        AttendanceCount, AttendanceRecord, ClassReport, NewAttendance, NewAttendanceBatch,
        StudentWindow, TimeRange, WindowView,
    },
    services::attendance_service,
    state::AppState,
    web::extract::{AppJson, AppQuery},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use serde_json::{json, Value};

/// `view` applies to record windows (student windows and the class `today`
/// report); `limit` only to `lastclasses`. Anything else is rejected.
#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    pub view: Option<WindowView>,
    /// K for `lastclasses`.
    pub limit: Option<i64>,
}

impl ReportParams {
    fn reject_limit(&self) -> AppResult<()> {
        match self.limit {
            Some(_) => Err(AppError::InvalidInput(
                "limit only applies to the lastclasses report".to_string(),
            )),
            None => Ok(()),
        }
    }

    fn reject_view(&self, report: &str) -> AppResult<()> {
        match self.view {
            Some(_) => Err(AppError::InvalidInput(format!(
                "view does not apply to the {} report",
                report
            ))),
            None => Ok(()),
        }
    }

    fn window_view(&self) -> AppResult<WindowView> {
        self.reject_limit()?;
        Ok(self.view.unwrap_or_default())
    }
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn render_window(records: Vec<AttendanceRecord>, view: WindowView) -> Response {
    match view {
        WindowView::Records => Json(records).into_response(),
        WindowView::Count => Json(AttendanceCount::from_records(&records)).into_response(),
    }
}

// GET /attendance
pub async fn list_attendance(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<AttendanceRecord>>> {
    let records = attendance_service::find_all(&state.db_pool).await?;
    Ok(Json(records))
}

// DELETE /attendance
pub async fn delete_attendance(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let deleted = attendance_service::delete_all(&state.db_pool).await?;
    Ok(Json(json!({
        "message": "All attendance records deleted",
        "deletedCount": deleted,
    })))
}

// POST /attendance
pub async fn create_attendance(
    State(state): State<AppState>,
    AppJson(new): AppJson<NewAttendance>,
) -> AppResult<(StatusCode, Json<AttendanceRecord>)> {
    let record = attendance_service::record_attendance(&state.db_pool, new, local_now()).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

// POST /attendance/multiple
pub async fn create_attendance_bulk(
    State(state): State<AppState>,
    AppJson(batch): AppJson<NewAttendanceBatch>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let records =
        attendance_service::record_attendance_bulk(&state.db_pool, batch, local_now()).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Multiple attendances added",
            "data": records,
        })),
    ))
}

// GET /attendance/:subject/:studentRoll/:window
pub async fn student_window(
    State(state): State<AppState>,
    Path((subject, student_roll, window)): Path<(String, String, String)>,
    AppQuery(params): AppQuery<ReportParams>,
) -> AppResult<Response> {
    let window: StudentWindow = window.parse().map_err(AppError::InvalidInput)?;
    let view = params.window_view()?;
    let records = attendance_service::find_for_student(
        &state.db_pool,
        &subject,
        &student_roll,
        window.range(local_now()),
    )
    .await?;
    Ok(render_window(records, view))
}

// GET /attendance/:dept/:className/:subject/:report
pub async fn class_report(
    State(state): State<AppState>,
    Path((dept, class_name, subject, report)): Path<(String, String, String, String)>,
    AppQuery(params): AppQuery<ReportParams>,
) -> AppResult<Response> {
    let report: ClassReport = report.parse().map_err(AppError::InvalidInput)?;
    let now = local_now();

    let response = match report {
        ClassReport::Today => {
            let view = params.window_view()?;
            let records = attendance_service::find_for_class(
                &state.db_pool,
                &dept,
                &class_name,
                &subject,
                TimeRange::whole_day(now.date()),
            )
            .await?;
            render_window(records, view)
        }
        ClassReport::LastWeek => {
            params.reject_view("lastweek")?;
            params.reject_limit()?;
            let summary = attendance_service::weekly_summary(
                &state.db_pool,
                &dept,
                &class_name,
                &subject,
                now.date(),
            )
            .await?;
            Json(summary).into_response()
        }
        ClassReport::LastClasses => {
            params.reject_view("lastclasses")?;
            let sessions = attendance_service::last_sessions(
                &state.db_pool,
                &dept,
                &class_name,
                &subject,
                params
                    .limit
                    .unwrap_or(attendance_service::DEFAULT_SESSION_LIMIT),
            )
            .await?;
            Json(sessions).into_response()
        }
    };
    Ok(response)
}

// GET /attendance/totalClasses/:dept/:className/:subject
pub async fn total_classes(
    State(state): State<AppState>,
    Path((dept, class_name, subject)): Path<(String, String, String)>,
) -> AppResult<Json<Value>> {
    let total =
        attendance_service::total_class_count(&state.db_pool, &dept, &class_name, &subject)
            .await?;
    Ok(Json(json!({ "totalClasses": total })))
}
