// src/services/mod.rs
use crate::error::{AppError, AppResult};

pub mod attendance_service;
pub mod routine_service;
pub mod teacher_service;

/// Rejects blank values the way a required schema field would.
pub(crate) fn ensure_present(fields: &[(&str, &str)]) -> AppResult<()> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!(
            "missing required field(s): {}",
            missing.join(", ")
        )))
    }
}

/// Unwraps an optional request field, treating blank strings as missing.
pub(crate) fn required(field: &str, value: Option<String>) -> AppResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::InvalidInput(format!(
            "missing required field: {}",
            field
        ))),
    }
}
