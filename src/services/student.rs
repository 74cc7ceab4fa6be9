use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, SqlErr, TryIntoModel,
};

use crate::entities::student;
use crate::error::AppError;

pub async fn create<C: ConnectionTrait>(
    db: &C,
    id: i32,
    class_id: i32,
    full_name: Option<String>,
) -> Result<student::Model, AppError> {
    let new_student = student::ActiveModel {
        id: Set(id),
        class_id: Set(class_id),
        full_name: Set(full_name),
        created_at: Set(chrono::Utc::now().into()),
    };

    match new_student.insert(db).await {
        Ok(model) => Ok(model),
        Err(e) => match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                Err(AppError::Conflict(format!("Student {id} already exists")))
            }
            _ => Err(e.into()),
        },
    }
}

pub async fn list<C: ConnectionTrait>(
    db: &C,
    class_id: Option<i32>,
) -> Result<Vec<student::Model>, AppError> {
    let mut select = student::Entity::find();
    if let Some(class_id) = class_id {
        select = select.filter(student::Column::ClassId.eq(class_id));
    }
    Ok(select
        .order_by_desc(student::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<student::Model, AppError> {
    student::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Student {id} not found")))
}

pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: i32,
    class_id: Option<i32>,
    full_name: Option<String>,
) -> Result<student::Model, AppError> {
    let existing = find_by_id(db, id).await?;

    let mut active = existing.into_active_model();
    let mut changed = false;
    if let Some(class_id) = class_id {
        active.class_id = Set(class_id);
        changed = true;
    }
    if let Some(full_name) = full_name {
        active.full_name = Set(Some(full_name));
        changed = true;
    }
    if !changed {
        return Ok(active.try_into_model().map_err(AppError::Db)?);
    }
    Ok(active.update(db).await?)
}

pub async fn delete<C: ConnectionTrait>(db: &C, id: i32) -> Result<(), AppError> {
    let res = student::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(AppError::NotFound(format!("Student {id} not found")));
    }
    Ok(())
}

/// Stub creation for report intake; the optional name is kept when the
/// vision payload supplies one.
pub async fn get_or_create<C: ConnectionTrait>(
    db: &C,
    id: i32,
    class_id: i32,
    full_name: Option<&str>,
) -> Result<student::Model, AppError> {
    if let Some(existing) = student::Entity::find_by_id(id).one(db).await? {
        return Ok(existing);
    }

    let stub = student::ActiveModel {
        id: Set(id),
        class_id: Set(class_id),
        full_name: Set(full_name.map(|s| s.to_string())),
        created_at: Set(chrono::Utc::now().into()),
    };
    Ok(stub.insert(db).await?)
}
