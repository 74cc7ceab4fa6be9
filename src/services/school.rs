use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryOrder, Set, SqlErr,
    TryIntoModel,
};

use crate::entities::school;
use crate::error::AppError;

/// Strict create: the natural id comes from the caller and must be free.
/// A duplicate id surfaces as `Conflict` via the primary-key constraint,
/// no pre-check.
pub async fn create<C: ConnectionTrait>(
    db: &C,
    id: i32,
    name: Option<String>,
) -> Result<school::Model, AppError> {
    let new_school = school::ActiveModel {
        id: Set(id),
        name: Set(name),
        created_at: Set(chrono::Utc::now().into()),
    };

    match new_school.insert(db).await {
        Ok(model) => Ok(model),
        Err(e) => match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                Err(AppError::Conflict(format!("School {id} already exists")))
            }
            _ => Err(e.into()),
        },
    }
}

pub async fn list<C: ConnectionTrait>(db: &C) -> Result<Vec<school::Model>, AppError> {
    Ok(school::Entity::find()
        .order_by_desc(school::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<school::Model, AppError> {
    school::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("School {id} not found")))
}

pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: i32,
    name: Option<String>,
) -> Result<school::Model, AppError> {
    let existing = find_by_id(db, id).await?;

    let mut active = existing.into_active_model();
    let mut changed = false;
    if let Some(name) = name {
        active.name = Set(Some(name));
        changed = true;
    }
    if !changed {
        return Ok(active.try_into_model().map_err(AppError::Db)?);
    }
    Ok(active.update(db).await?)
}

pub async fn delete<C: ConnectionTrait>(db: &C, id: i32) -> Result<(), AppError> {
    let res = school::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(AppError::NotFound(format!("School {id} not found")));
    }
    Ok(())
}

/// Lenient variant used by report intake: returns the existing school or
/// inserts a stub carrying nothing but the id.
pub async fn get_or_create<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<school::Model, AppError> {
    if let Some(existing) = school::Entity::find_by_id(id).one(db).await? {
        return Ok(existing);
    }

    let stub = school::ActiveModel {
        id: Set(id),
        name: Set(None),
        created_at: Set(chrono::Utc::now().into()),
    };
    Ok(stub.insert(db).await?)
}
