// src/models/mod.rs
pub mod attendance;
pub mod routine;
pub mod teacher;
