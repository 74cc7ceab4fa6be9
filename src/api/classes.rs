use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;

use crate::api::{validate_natural_id, MessageResponse};
use crate::error::AppError;
use crate::services::class_room;

#[derive(serde::Deserialize)]
pub struct CreateClassRequest {
    id: i32,
    school_id: i32,
    class_index: String,
}

#[derive(serde::Deserialize)]
pub struct UpdateClassRequest {
    school_id: Option<i32>,
    class_index: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct ClassListParams {
    school_id: Option<i32>,
}

pub async fn create_class(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<CreateClassRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_natural_id("class id", payload.id)?;
    validate_natural_id("school id", payload.school_id)?;
    let created = class_room::create(&db, payload.id, payload.school_id, payload.class_index).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_classes(
    Extension(db): Extension<DatabaseConnection>,
    Query(params): Query<ClassListParams>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(school_id) = params.school_id {
        validate_natural_id("school id", school_id)?;
    }
    Ok(Json(class_room::list(&db, params.school_id).await?))
}

pub async fn get_class(
    Extension(db): Extension<DatabaseConnection>,
    Path(class_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(class_room::find_by_id(&db, class_id).await?))
}

pub async fn update_class(
    Extension(db): Extension<DatabaseConnection>,
    Path(class_id): Path<i32>,
    Json(payload): Json<UpdateClassRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(school_id) = payload.school_id {
        validate_natural_id("school id", school_id)?;
    }
    Ok(Json(
        class_room::update(&db, class_id, payload.school_id, payload.class_index).await?,
    ))
}

pub async fn delete_class(
    Extension(db): Extension<DatabaseConnection>,
    Path(class_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    class_room::delete(&db, class_id).await?;
    Ok(Json(MessageResponse {
        detail: format!("ClassRoom {class_id} deleted"),
    }))
}
