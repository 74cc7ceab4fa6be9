use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;

use crate::api::{validate_natural_id, MessageResponse};
use crate::error::AppError;
use crate::services::student;

#[derive(serde::Deserialize)]
pub struct CreateStudentRequest {
    id: i32,
    class_id: i32,
    full_name: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct UpdateStudentRequest {
    class_id: Option<i32>,
    full_name: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct StudentListParams {
    class_id: Option<i32>,
}

pub async fn create_student(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<CreateStudentRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_natural_id("student id", payload.id)?;
    validate_natural_id("class id", payload.class_id)?;
    let created = student::create(&db, payload.id, payload.class_id, payload.full_name).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_students(
    Extension(db): Extension<DatabaseConnection>,
    Query(params): Query<StudentListParams>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(class_id) = params.class_id {
        validate_natural_id("class id", class_id)?;
    }
    Ok(Json(student::list(&db, params.class_id).await?))
}

pub async fn get_student(
    Extension(db): Extension<DatabaseConnection>,
    Path(student_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(student::find_by_id(&db, student_id).await?))
}

pub async fn update_student(
    Extension(db): Extension<DatabaseConnection>,
    Path(student_id): Path<i32>,
    Json(payload): Json<UpdateStudentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(class_id) = payload.class_id {
        validate_natural_id("class id", class_id)?;
    }
    Ok(Json(
        student::update(&db, student_id, payload.class_id, payload.full_name).await?,
    ))
}

pub async fn delete_student(
    Extension(db): Extension<DatabaseConnection>,
    Path(student_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    student::delete(&db, student_id).await?;
    Ok(Json(MessageResponse {
        detail: format!("Student {student_id} deleted"),
    }))
}
