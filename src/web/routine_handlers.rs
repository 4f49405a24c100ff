// src/web/routine_handlers.rs
use crate::{
    error::AppResult,
    models::routine::{NewSession, RoutineSession, SessionPatch, StatusUpdate},
    services::routine_service,
    state::AppState,
    web::extract::AppJson,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{Local, NaiveDate};
use serde_json::{json, Value};

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

// GET /routine/uniqueSubjects/:department/:semester/:section
pub async fn unique_subjects(
    State(state): State<AppState>,
    Path((department, semester, section)): Path<(String, String, String)>,
) -> AppResult<Json<Value>> {
    let subjects =
        routine_service::unique_subjects(&state.db_pool, &department, &semester, &section).await?;
    Ok(Json(json!({ "subjects": subjects })))
}

// GET /routine/classRoutine/:department/:semester/:section/:day
pub async fn class_routine(
    State(state): State<AppState>,
    Path((department, semester, section, day)): Path<(String, String, String, String)>,
) -> AppResult<Json<Value>> {
    let sessions =
        routine_service::class_routine(&state.db_pool, &department, &semester, &section, &day)
            .await?;
    Ok(Json(json!({ "sessions": sessions })))
}

// GET /routine/all/:teacherId
pub async fn teacher_sessions(
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
) -> AppResult<Json<Value>> {
    let sessions = routine_service::teacher_sessions(&state.db_pool, &teacher_id).await?;
    Ok(Json(json!({ "sessions": sessions })))
}

// GET /routine/:teacherId/:day
pub async fn day_routine(
    State(state): State<AppState>,
    Path((teacher_id, day)): Path<(String, String)>,
) -> AppResult<Json<Value>> {
    let routine =
        routine_service::day_routine(&state.db_pool, &teacher_id, &day, local_today()).await?;
    Ok(Json(json!({ "routine": routine })))
}

// POST /routine/:teacherId/:day
pub async fn create_session(
    State(state): State<AppState>,
    Path((teacher_id, day)): Path<(String, String)>,
    AppJson(new): AppJson<NewSession>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let routine = routine_service::create_session(&state.db_pool, &teacher_id, &day, new).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Routine added successfully",
            "routine": routine,
        })),
    ))
}

// PATCH /routine/:routineId
pub async fn append_status(
    State(state): State<AppState>,
    Path(routine_id): Path<String>,
    AppJson(update): AppJson<StatusUpdate>,
) -> AppResult<Json<RoutineSession>> {
    let session =
        routine_service::append_status(&state.db_pool, &routine_id, &update.status, local_today())
            .await?;
    Ok(Json(session))
}

// PATCH /routine/session/:sessionId
pub async fn update_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    AppJson(patch): AppJson<SessionPatch>,
) -> AppResult<Json<Value>> {
    let session =
        routine_service::update_session(&state.db_pool, &session_id, patch, local_today()).await?;
    Ok(Json(json!({
        "message": "Session updated successfully",
        "session": session,
    })))
}

// DELETE /routine
pub async fn delete_sessions(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let deleted = routine_service::delete_all(&state.db_pool).await?;
    Ok(Json(json!({
        "message": "All sessions deleted successfully",
        "deletedCount": deleted,
    })))
}
