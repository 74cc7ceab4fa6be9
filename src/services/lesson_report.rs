use chrono::{NaiveDate, NaiveTime};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, ConnectionTrait, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TryIntoModel,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::{attention_entry, lesson_report, unrecognized_entry};
use crate::error::AppError;
use crate::images::ImageStore;
use crate::services::{class_room, school, student};

// ── Intake payloads ────────────────────────────────────────────────────

#[derive(Clone, Debug, Deserialize)]
pub struct StudentEntryCreate {
    pub student_id: i32,
    pub name: Option<String>,
    pub image: Option<String>,
    pub attention: i32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UnrecognizedEntryCreate {
    pub image: Option<String>,
    pub attention: i32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LessonReportCreate {
    pub class_id: i32,
    pub school_id: i32,
    pub class_index: String,
    pub lesson_time: NaiveTime,
    pub lesson_date: Option<NaiveDate>,
    pub students_count: i32,
    pub students: Vec<StudentEntryCreate>,
    #[serde(default)]
    pub unrecognized_students: Vec<UnrecognizedEntryCreate>,
}

/// Partial update: only supplied fields are overwritten. A supplied
/// `students` list replaces all entries and images wholesale.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LessonReportUpdate {
    pub class_id: Option<i32>,
    pub school_id: Option<i32>,
    pub class_index: Option<String>,
    pub lesson_time: Option<NaiveTime>,
    pub lesson_date: Option<NaiveDate>,
    pub students_count: Option<i32>,
    pub students: Option<Vec<StudentEntryCreate>>,
    pub unrecognized_students: Option<Vec<UnrecognizedEntryCreate>>,
}

/// A report row with both child sets loaded eagerly.
#[derive(Clone, Debug)]
pub struct FullReport {
    pub report: lesson_report::Model,
    pub students: Vec<attention_entry::Model>,
    pub unrecognized_students: Vec<unrecognized_entry::Model>,
}

#[derive(Clone, Debug, Default)]
pub struct ReportFilter {
    pub school_id: Option<i32>,
    pub class_id: Option<i32>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub limit: u64,
    pub offset: u64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ── Intake pipeline ────────────────────────────────────────────────────

/// Process a full lesson report from the vision system: provision stub
/// parents, save images, insert entries, compute aggregates. The caller
/// runs this inside a transaction; image files written before a failure
/// are swept here by removing the report's directory.
pub async fn create<C: ConnectionTrait>(
    db: &C,
    images: &ImageStore,
    data: &LessonReportCreate,
) -> Result<FullReport, AppError> {
    let report_id = Uuid::new_v4();
    let result = create_inner(db, images, report_id, data).await;
    if result.is_err() {
        images.remove_report_dir(report_id);
    }
    result
}

async fn create_inner<C: ConnectionTrait>(
    db: &C,
    images: &ImageStore,
    report_id: Uuid,
    data: &LessonReportCreate,
) -> Result<FullReport, AppError> {
    // Server date when the payload leaves it out
    let report_date = data
        .lesson_date
        .unwrap_or_else(|| chrono::Utc::now().date_naive());

    school::get_or_create(db, data.school_id).await?;
    class_room::get_or_create(db, data.class_id, data.school_id, &data.class_index).await?;

    let report = lesson_report::ActiveModel {
        id: Set(report_id),
        school_id: Set(data.school_id),
        class_id: Set(data.class_id),
        class_index: Set(data.class_index.clone()),
        lesson_date: Set(report_date),
        lesson_time: Set(data.lesson_time),
        students_count: Set(data.students_count),
        avg_attention: Set(0.0),
        avg_inattention: Set(0.0),
        created_at: Set(chrono::Utc::now().into()),
    };
    report.insert(db).await?;

    let attentions = insert_entries(
        db,
        images,
        report_id,
        data.class_id,
        &data.students,
        &data.unrecognized_students,
    )
    .await?;

    apply_averages(db, report_id, &attentions).await?;

    tracing::info!(report_id = %report_id, class_index = %data.class_index, "created lesson report");

    load_full(db, report_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("LessonReport {report_id} not found")))
}

/// Insert both entry kinds in input order and return the accumulated
/// attention values.
async fn insert_entries<C: ConnectionTrait>(
    db: &C,
    images: &ImageStore,
    report_id: Uuid,
    class_id: i32,
    students: &[StudentEntryCreate],
    unrecognized: &[UnrecognizedEntryCreate],
) -> Result<Vec<i32>, AppError> {
    let mut attentions = Vec::with_capacity(students.len() + unrecognized.len());

    for entry in students {
        student::get_or_create(db, entry.student_id, class_id, entry.name.as_deref()).await?;

        let filename = match &entry.image {
            Some(image) => Some(images.save_image(report_id, image)?),
            None => None,
        };

        let record = attention_entry::ActiveModel {
            id: Set(Uuid::new_v4()),
            report_id: Set(report_id),
            student_id: Set(entry.student_id),
            attention: Set(entry.attention),
            inattention: Set(100 - entry.attention),
            image_path: Set(filename),
            created_at: Set(chrono::Utc::now().into()),
        };
        record.insert(db).await?;
        attentions.push(entry.attention);
    }

    for entry in unrecognized {
        let filename = match &entry.image {
            Some(image) => Some(images.save_image(report_id, image)?),
            None => None,
        };

        let record = unrecognized_entry::ActiveModel {
            id: Set(Uuid::new_v4()),
            report_id: Set(report_id),
            attention: Set(entry.attention),
            inattention: Set(100 - entry.attention),
            image_path: Set(filename),
            created_at: Set(chrono::Utc::now().into()),
        };
        record.insert(db).await?;
        attentions.push(entry.attention);
    }

    Ok(attentions)
}

/// Aggregates stay at 0.0 for an empty entry set.
async fn apply_averages<C: ConnectionTrait>(
    db: &C,
    report_id: Uuid,
    attentions: &[i32],
) -> Result<(), AppError> {
    if attentions.is_empty() {
        return Ok(());
    }
    let mean = attentions.iter().map(|&a| a as f64).sum::<f64>() / attentions.len() as f64;

    let update = lesson_report::ActiveModel {
        id: Unchanged(report_id),
        avg_attention: Set(round2(mean)),
        avg_inattention: Set(round2(100.0 - mean)),
        ..Default::default()
    };
    update.update(db).await?;
    Ok(())
}

// ── Query / assembly ───────────────────────────────────────────────────

pub async fn load_full<C: ConnectionTrait>(
    db: &C,
    report_id: Uuid,
) -> Result<Option<FullReport>, AppError> {
    let Some(report) = lesson_report::Entity::find_by_id(report_id).one(db).await? else {
        return Ok(None);
    };

    let students = attention_entry::Entity::find()
        .filter(attention_entry::Column::ReportId.eq(report_id))
        .order_by_asc(attention_entry::Column::CreatedAt)
        .all(db)
        .await?;
    let unrecognized_students = unrecognized_entry::Entity::find()
        .filter(unrecognized_entry::Column::ReportId.eq(report_id))
        .order_by_asc(unrecognized_entry::Column::CreatedAt)
        .all(db)
        .await?;

    Ok(Some(FullReport {
        report,
        students,
        unrecognized_students,
    }))
}

pub async fn get<C: ConnectionTrait>(db: &C, report_id: Uuid) -> Result<FullReport, AppError> {
    load_full(db, report_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("LessonReport {report_id} not found")))
}

/// Filtered summary listing with total count, newest first.
pub async fn list<C: ConnectionTrait>(
    db: &C,
    filter: &ReportFilter,
) -> Result<(Vec<lesson_report::Model>, u64), AppError> {
    let mut select = lesson_report::Entity::find();

    if let Some(school_id) = filter.school_id {
        select = select.filter(lesson_report::Column::SchoolId.eq(school_id));
    }
    if let Some(class_id) = filter.class_id {
        select = select.filter(lesson_report::Column::ClassId.eq(class_id));
    }
    if let Some(date_from) = filter.date_from {
        select = select.filter(lesson_report::Column::LessonDate.gte(date_from));
    }
    if let Some(date_to) = filter.date_to {
        select = select.filter(lesson_report::Column::LessonDate.lte(date_to));
    }

    let total = select.clone().count(db).await?;

    let reports = select
        .order_by_desc(lesson_report::Column::CreatedAt)
        .limit(filter.limit)
        .offset(filter.offset)
        .all(db)
        .await?;

    Ok((reports, total))
}

pub async fn latest_for_class<C: ConnectionTrait>(
    db: &C,
    class_id: i32,
) -> Result<FullReport, AppError> {
    let report = lesson_report::Entity::find()
        .filter(lesson_report::Column::ClassId.eq(class_id))
        .order_by_desc(lesson_report::Column::CreatedAt)
        .one(db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No lesson reports found for class {class_id}"))
        })?;

    get(db, report.id).await
}

// ── Update / delete ────────────────────────────────────────────────────

/// Overwrite supplied scalar fields; when a new students list is supplied,
/// discard every existing entry row and image file and rebuild from the
/// new list. Without a list, entries, images and aggregates stay as-is.
pub async fn update<C: ConnectionTrait>(
    db: &C,
    images: &ImageStore,
    report_id: Uuid,
    data: &LessonReportUpdate,
) -> Result<FullReport, AppError> {
    let existing = lesson_report::Entity::find_by_id(report_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("LessonReport {report_id} not found")))?;

    let mut active = existing.into_active_model();
    let mut changed = false;
    if let Some(class_id) = data.class_id {
        active.class_id = Set(class_id);
        changed = true;
    }
    if let Some(school_id) = data.school_id {
        active.school_id = Set(school_id);
        changed = true;
    }
    if let Some(class_index) = &data.class_index {
        active.class_index = Set(class_index.clone());
        changed = true;
    }
    if let Some(lesson_time) = data.lesson_time {
        active.lesson_time = Set(lesson_time);
        changed = true;
    }
    if let Some(lesson_date) = data.lesson_date {
        active.lesson_date = Set(lesson_date);
        changed = true;
    }
    if let Some(students_count) = data.students_count {
        active.students_count = Set(students_count);
        changed = true;
    }

    let report = if changed {
        active.update(db).await?
    } else {
        active.try_into_model().map_err(AppError::Db)?
    };

    if let Some(students) = &data.students {
        let result = replace_entries(db, images, &report, students, data).await;
        if result.is_err() {
            images.remove_report_dir(report_id);
        }
        result?;
    }

    get(db, report_id).await
}

async fn replace_entries<C: ConnectionTrait>(
    db: &C,
    images: &ImageStore,
    report: &lesson_report::Model,
    students: &[StudentEntryCreate],
    data: &LessonReportUpdate,
) -> Result<(), AppError> {
    attention_entry::Entity::delete_many()
        .filter(attention_entry::Column::ReportId.eq(report.id))
        .exec(db)
        .await?;
    unrecognized_entry::Entity::delete_many()
        .filter(unrecognized_entry::Column::ReportId.eq(report.id))
        .exec(db)
        .await?;

    // Old image files go with the old entries
    images.remove_report_dir(report.id);
    images.report_dir(report.id)?;

    let unrecognized = data.unrecognized_students.clone().unwrap_or_default();
    let attentions = insert_entries(
        db,
        images,
        report.id,
        report.class_id,
        students,
        &unrecognized,
    )
    .await?;

    apply_averages(db, report.id, &attentions).await
}

/// Remove the report's rows (children cascade) and its image directory.
pub async fn delete<C: ConnectionTrait>(
    db: &C,
    images: &ImageStore,
    report_id: Uuid,
) -> Result<(), AppError> {
    let res = lesson_report::Entity::delete_by_id(report_id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(AppError::NotFound(format!(
            "LessonReport {report_id} not found"
        )));
    }
    images.remove_report_dir(report_id);
    Ok(())
}
