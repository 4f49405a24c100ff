// src/web/mod.rs
pub mod attendance_handlers;
pub mod extract;
pub mod routes;
pub mod routine_handlers;
pub mod teacher_handlers;
