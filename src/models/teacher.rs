// src/models/teacher.rs
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A (department, className, subject) triple a teacher is confirmed to teach.
/// `class_name` is `"<semester>-<section>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AssignedClass {
    pub department: String,
    pub class_name: String,
    pub subject: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sqlx(skip)]
    pub assigned_classes: Vec<AssignedClass>,
}

/// Body of `POST /teachers`.
#[derive(Debug, Default, Deserialize)]
pub struct NewTeacher {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}
