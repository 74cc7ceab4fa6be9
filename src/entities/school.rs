use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "schools")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub name: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::class_room::Entity")]
    ClassRoom,
    #[sea_orm(has_many = "super::lesson_report::Entity")]
    LessonReport,
}

impl Related<super::class_room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassRoom.def()
    }
}

impl Related<super::lesson_report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LessonReport.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
