use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;

use crate::api::{validate_natural_id, MessageResponse};
use crate::error::AppError;
use crate::services::school;

#[derive(serde::Deserialize)]
pub struct CreateSchoolRequest {
    id: i32,
    name: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct UpdateSchoolRequest {
    name: Option<String>,
}

pub async fn create_school(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<CreateSchoolRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_natural_id("school id", payload.id)?;
    let created = school::create(&db, payload.id, payload.name).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_schools(
    Extension(db): Extension<DatabaseConnection>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(school::list(&db).await?))
}

pub async fn get_school(
    Extension(db): Extension<DatabaseConnection>,
    Path(school_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(school::find_by_id(&db, school_id).await?))
}

pub async fn update_school(
    Extension(db): Extension<DatabaseConnection>,
    Path(school_id): Path<i32>,
    Json(payload): Json<UpdateSchoolRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(school::update(&db, school_id, payload.name).await?))
}

pub async fn delete_school(
    Extension(db): Extension<DatabaseConnection>,
    Path(school_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    school::delete(&db, school_id).await?;
    Ok(Json(MessageResponse {
        detail: format!("School {school_id} deleted"),
    }))
}
