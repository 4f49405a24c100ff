// src/web/teacher_handlers.rs
use crate::{
    error::AppResult,
    models::teacher::{NewTeacher, Teacher},
    services::teacher_service,
    state::AppState,
    web::extract::AppJson,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

pub async fn list_teachers(State(state): State<AppState>) -> AppResult<Json<Vec<Teacher>>> {
    Ok(Json(teacher_service::find_all_teachers(&state.db_pool).await?))
}

pub async fn create_teacher(
    State(state): State<AppState>,
    AppJson(new): AppJson<NewTeacher>,
) -> AppResult<(StatusCode, Json<Teacher>)> {
    let teacher =
        teacher_service::create_teacher(&state.db_pool, new, state.password_cost).await?;
    Ok((StatusCode::CREATED, Json(teacher)))
}

pub async fn get_teacher(
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
) -> AppResult<Json<Teacher>> {
    Ok(Json(teacher_service::get_teacher(&state.db_pool, &teacher_id).await?))
}

pub async fn assigned_classes(
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
) -> AppResult<Json<Value>> {
    let classes = teacher_service::assigned_classes(&state.db_pool, &teacher_id).await?;
    Ok(Json(json!({ "assignedClasses": classes })))
}
