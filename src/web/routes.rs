// src/web/routes.rs
use crate::{
    state::AppState,
    web::{attendance_handlers, routine_handlers, teacher_handlers},
};
use axum::{
    routing::{delete, get, patch, post},
    Router,
};

pub fn create_router(app_state: AppState) -> Router {
    // Student windows (/:subject/:studentRoll/:window) and class reports
    // (/:dept/:className/:subject/:report) share their leading segments, so
    // the parameter names must match; handlers destructure them positionally.
    let attendance_routes = Router::new()
        .route(
            "/attendance",
            get(attendance_handlers::list_attendance)
                .post(attendance_handlers::create_attendance)
                .delete(attendance_handlers::delete_attendance),
        )
        .route(
            "/attendance/multiple",
            post(attendance_handlers::create_attendance_bulk),
        )
        .route(
            "/attendance/totalClasses/{dept}/{class_name}/{subject}",
            get(attendance_handlers::total_classes),
        )
        .route(
            "/attendance/{first}/{second}/{third}",
            get(attendance_handlers::student_window),
        )
        .route(
            "/attendance/{first}/{second}/{third}/{report}",
            get(attendance_handlers::class_report),
        );

    let routine_routes = Router::new()
        .route("/routine", delete(routine_handlers::delete_sessions))
        .route(
            "/routine/uniqueSubjects/{department}/{semester}/{section}",
            get(routine_handlers::unique_subjects),
        )
        .route(
            "/routine/classRoutine/{department}/{semester}/{section}/{day}",
            get(routine_handlers::class_routine),
        )
        .route("/routine/all/{id}", get(routine_handlers::teacher_sessions))
        .route(
            "/routine/session/{id}",
            patch(routine_handlers::update_session),
        )
        .route("/routine/{id}", patch(routine_handlers::append_status))
        .route(
            "/routine/{id}/{day}",
            get(routine_handlers::day_routine).post(routine_handlers::create_session),
        );

    let teacher_routes = Router::new()
        .route(
            "/teachers",
            get(teacher_handlers::list_teachers).post(teacher_handlers::create_teacher),
        )
        .route("/teacher/{id}", get(teacher_handlers::get_teacher))
        .route(
            "/teacher/{id}/assigned-classes",
            get(teacher_handlers::assigned_classes),
        );

    Router::new()
        .merge(attendance_routes)
        .merge(routine_routes)
        .merge(teacher_routes)
        .with_state(app_state)
}
