use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{validate_natural_id, MessageResponse, Paginated};
use crate::error::AppError;
use crate::images::ImageStore;
use crate::services::lesson_report::{
    self, FullReport, LessonReportCreate, LessonReportUpdate, ReportFilter, StudentEntryCreate,
    UnrecognizedEntryCreate,
};

// ── Response shapes ────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StudentEntryResponse {
    pub id: Uuid,
    pub student_id: i32,
    pub attention: i32,
    pub inattention: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

#[derive(Debug, Serialize)]
pub struct UnrecognizedEntryResponse {
    pub id: Uuid,
    pub attention: i32,
    pub inattention: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

#[derive(Debug, Serialize)]
pub struct LessonReportResponse {
    pub id: Uuid,
    pub school_id: i32,
    pub class_id: i32,
    pub class_index: String,
    pub lesson_date: NaiveDate,
    pub lesson_time: NaiveTime,
    pub students_count: i32,
    pub avg_attention: f64,
    pub avg_inattention: f64,
    pub created_at: DateTime<FixedOffset>,
    pub students: Vec<StudentEntryResponse>,
    pub unrecognized_students: Vec<UnrecognizedEntryResponse>,
}

fn build_image_url(report_id: Uuid, image_path: Option<&str>) -> Option<String> {
    image_path.map(|path| format!("/images/{report_id}/{path}"))
}

fn report_to_response(full: FullReport) -> LessonReportResponse {
    let report_id = full.report.id;
    let students = full
        .students
        .into_iter()
        .map(|e| StudentEntryResponse {
            id: e.id,
            student_id: e.student_id,
            attention: e.attention,
            inattention: e.inattention,
            image_url: build_image_url(report_id, e.image_path.as_deref()),
            created_at: e.created_at,
        })
        .collect();
    let unrecognized_students = full
        .unrecognized_students
        .into_iter()
        .map(|e| UnrecognizedEntryResponse {
            id: e.id,
            attention: e.attention,
            inattention: e.inattention,
            image_url: build_image_url(report_id, e.image_path.as_deref()),
            created_at: e.created_at,
        })
        .collect();

    LessonReportResponse {
        id: full.report.id,
        school_id: full.report.school_id,
        class_id: full.report.class_id,
        class_index: full.report.class_index,
        lesson_date: full.report.lesson_date,
        lesson_time: full.report.lesson_time,
        students_count: full.report.students_count,
        avg_attention: full.report.avg_attention,
        avg_inattention: full.report.avg_inattention,
        created_at: full.report.created_at,
        students,
        unrecognized_students,
    }
}

// ── Boundary validation ────────────────────────────────────────────────

fn validate_attention(attention: i32) -> Result<(), AppError> {
    if !(1..=100).contains(&attention) {
        return Err(AppError::Validation(format!(
            "attention must be between 1 and 100, got {attention}"
        )));
    }
    Ok(())
}

fn validate_entries(
    students: &[StudentEntryCreate],
    unrecognized: &[UnrecognizedEntryCreate],
) -> Result<(), AppError> {
    for entry in students {
        validate_natural_id("student id", entry.student_id)?;
        validate_attention(entry.attention)?;
    }
    for entry in unrecognized {
        validate_attention(entry.attention)?;
    }
    Ok(())
}

fn check_students_count(count: i32, students: usize, unrecognized: usize) -> Result<(), AppError> {
    let actual = students + unrecognized;
    if count < 0 || count as usize != actual {
        return Err(AppError::Validation(format!(
            "students_count ({count}) must equal len(students) + len(unrecognized_students) ({actual})"
        )));
    }
    Ok(())
}

fn validate_create(payload: &LessonReportCreate) -> Result<(), AppError> {
    validate_natural_id("school id", payload.school_id)?;
    validate_natural_id("class id", payload.class_id)?;
    check_students_count(
        payload.students_count,
        payload.students.len(),
        payload.unrecognized_students.len(),
    )?;
    validate_entries(&payload.students, &payload.unrecognized_students)
}

fn validate_update(payload: &LessonReportUpdate) -> Result<(), AppError> {
    if let Some(school_id) = payload.school_id {
        validate_natural_id("school id", school_id)?;
    }
    if let Some(class_id) = payload.class_id {
        validate_natural_id("class id", class_id)?;
    }

    let no_entries = Vec::new();
    let students = payload.students.as_deref().unwrap_or(&no_entries);
    let no_unrecognized = Vec::new();
    let unrecognized = payload
        .unrecognized_students
        .as_deref()
        .unwrap_or(&no_unrecognized);
    validate_entries(students, unrecognized)?;

    // Count is only enforceable when both the list and the count are supplied
    if let (Some(_), Some(count)) = (&payload.students, payload.students_count) {
        check_students_count(count, students.len(), unrecognized.len())?;
    }
    Ok(())
}

// ── Handlers ───────────────────────────────────────────────────────────

pub async fn create_lesson_report(
    Extension(db): Extension<DatabaseConnection>,
    Extension(images): Extension<ImageStore>,
    Json(payload): Json<LessonReportCreate>,
) -> Result<impl IntoResponse, AppError> {
    validate_create(&payload)?;

    let txn = db.begin().await?;
    let full = lesson_report::create(&txn, &images, &payload).await?;
    let report_id = full.report.id;
    if let Err(e) = txn.commit().await {
        images.remove_report_dir(report_id);
        return Err(e.into());
    }

    Ok((StatusCode::CREATED, Json(report_to_response(full))))
}

#[derive(Debug, Deserialize)]
pub struct ReportListParams {
    pub school_id: Option<i32>,
    pub class_id: Option<i32>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    50
}

pub async fn list_lesson_reports(
    Extension(db): Extension<DatabaseConnection>,
    Query(params): Query<ReportListParams>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(school_id) = params.school_id {
        validate_natural_id("school id", school_id)?;
    }
    if let Some(class_id) = params.class_id {
        validate_natural_id("class id", class_id)?;
    }

    let filter = ReportFilter {
        school_id: params.school_id,
        class_id: params.class_id,
        date_from: params.date_from,
        date_to: params.date_to,
        limit: params.limit.clamp(1, 200),
        offset: params.offset,
    };
    let (reports, total) = lesson_report::list(&db, &filter).await?;

    Ok(Json(Paginated {
        items: reports,
        total,
        limit: filter.limit,
        offset: filter.offset,
    }))
}

pub async fn get_lesson_report(
    Extension(db): Extension<DatabaseConnection>,
    Path(report_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let full = lesson_report::get(&db, report_id).await?;
    Ok(Json(report_to_response(full)))
}

pub async fn update_lesson_report(
    Extension(db): Extension<DatabaseConnection>,
    Extension(images): Extension<ImageStore>,
    Path(report_id): Path<Uuid>,
    Json(payload): Json<LessonReportUpdate>,
) -> Result<impl IntoResponse, AppError> {
    validate_update(&payload)?;

    let txn = db.begin().await?;
    let full = lesson_report::update(&txn, &images, report_id, &payload).await?;
    if let Err(e) = txn.commit().await {
        if payload.students.is_some() {
            images.remove_report_dir(report_id);
        }
        return Err(e.into());
    }

    Ok(Json(report_to_response(full)))
}

pub async fn delete_lesson_report(
    Extension(db): Extension<DatabaseConnection>,
    Extension(images): Extension<ImageStore>,
    Path(report_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let txn = db.begin().await?;
    lesson_report::delete(&txn, &images, report_id).await?;
    txn.commit().await?;

    Ok(Json(MessageResponse {
        detail: format!("LessonReport {report_id} deleted"),
    }))
}

pub async fn get_latest_report_for_class(
    Extension(db): Extension<DatabaseConnection>,
    Path(class_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    validate_natural_id("class id", class_id)?;
    let full = lesson_report::latest_for_class(&db, class_id).await?;
    Ok(Json(report_to_response(full)))
}
