use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, SqlErr, TryIntoModel,
};

use crate::entities::class_room;
use crate::error::AppError;

pub async fn create<C: ConnectionTrait>(
    db: &C,
    id: i32,
    school_id: i32,
    class_index: String,
) -> Result<class_room::Model, AppError> {
    let new_class = class_room::ActiveModel {
        id: Set(id),
        school_id: Set(school_id),
        class_index: Set(class_index),
        created_at: Set(chrono::Utc::now().into()),
    };

    match new_class.insert(db).await {
        Ok(model) => Ok(model),
        Err(e) => match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                Err(AppError::Conflict(format!("ClassRoom {id} already exists")))
            }
            _ => Err(e.into()),
        },
    }
}

pub async fn list<C: ConnectionTrait>(
    db: &C,
    school_id: Option<i32>,
) -> Result<Vec<class_room::Model>, AppError> {
    let mut select = class_room::Entity::find();
    if let Some(school_id) = school_id {
        select = select.filter(class_room::Column::SchoolId.eq(school_id));
    }
    Ok(select
        .order_by_desc(class_room::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn find_by_id<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<class_room::Model, AppError> {
    class_room::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("ClassRoom {id} not found")))
}

pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: i32,
    school_id: Option<i32>,
    class_index: Option<String>,
) -> Result<class_room::Model, AppError> {
    let existing = find_by_id(db, id).await?;

    let mut active = existing.into_active_model();
    let mut changed = false;
    if let Some(school_id) = school_id {
        active.school_id = Set(school_id);
        changed = true;
    }
    if let Some(class_index) = class_index {
        active.class_index = Set(class_index);
        changed = true;
    }
    if !changed {
        return Ok(active.try_into_model().map_err(AppError::Db)?);
    }
    Ok(active.update(db).await?)
}

pub async fn delete<C: ConnectionTrait>(db: &C, id: i32) -> Result<(), AppError> {
    let res = class_room::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(AppError::NotFound(format!("ClassRoom {id} not found")));
    }
    Ok(())
}

/// Stub creation for report intake: only the id, owning school and the
/// submitted class-index label are known at this point.
pub async fn get_or_create<C: ConnectionTrait>(
    db: &C,
    id: i32,
    school_id: i32,
    class_index: &str,
) -> Result<class_room::Model, AppError> {
    if let Some(existing) = class_room::Entity::find_by_id(id).one(db).await? {
        return Ok(existing);
    }

    let stub = class_room::ActiveModel {
        id: Set(id),
        school_id: Set(school_id),
        class_index: Set(class_index.to_string()),
        created_at: Set(chrono::Utc::now().into()),
    };
    Ok(stub.insert(db).await?)
}
