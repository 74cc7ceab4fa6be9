pub mod classes;
pub mod images;
pub mod lesson_reports;
pub mod schools;
pub mod students;

use serde::Serialize;

use crate::error::AppError;

pub const NATURAL_ID_MIN: i32 = 10_000_000;
pub const NATURAL_ID_MAX: i32 = 99_999_999;

/// School/class/student ids are externally assigned 8-digit integers.
/// Checked at the boundary, before any service logic runs.
pub fn validate_natural_id(label: &str, id: i32) -> Result<(), AppError> {
    if !(NATURAL_ID_MIN..=NATURAL_ID_MAX).contains(&id) {
        return Err(AppError::Validation(format!(
            "{label} must be an 8-digit integer, got {id}"
        )));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub detail: String,
}
