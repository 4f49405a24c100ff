// src/models/routine.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};

/// One weekly class slot taught by a teacher.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RoutineSession {
    pub id: String,
    pub teacher_id: String,
    pub day: String,
    pub department: String,
    pub semester: String,
    pub section: String,
    pub subject: String,
    /// "hh:mm AM/PM"
    pub start_time: String,
    pub end_time: String,
    /// Markers accumulated during the current day, cleared on the first read
    /// of a new day.
    pub status: Json<Vec<String>>,
    pub last_updated: Option<NaiveDate>,
}

/// Body of `POST /routine/:teacherId/:day`. Every field is required; they are
/// optional here so a missing one answers with a single clear message.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub department: Option<String>,
    pub semester: Option<String>,
    pub section: Option<String>,
    pub subject: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// Body of `PATCH /routine/:routineId`.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// Body of `PATCH /routine/session/:sessionId`. Absent fields keep their
/// stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPatch {
    pub day: Option<String>,
    pub department: Option<String>,
    pub semester: Option<String>,
    pub section: Option<String>,
    pub subject: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub status: Option<Vec<String>>,
}
