use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "lesson_reports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(skip_deserializing)]
    pub id: Uuid,
    pub school_id: i32,
    pub class_id: i32,
    pub class_index: String,
    pub lesson_date: Date,
    pub lesson_time: Time,
    pub students_count: i32,
    pub avg_attention: f64,
    pub avg_inattention: f64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::school::Entity",
        from = "Column::SchoolId",
        to = "super::school::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    School,
    #[sea_orm(
        belongs_to = "super::class_room::Entity",
        from = "Column::ClassId",
        to = "super::class_room::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    ClassRoom,
    #[sea_orm(has_many = "super::attention_entry::Entity")]
    AttentionEntry,
    #[sea_orm(has_many = "super::unrecognized_entry::Entity")]
    UnrecognizedEntry,
}

impl Related<super::school::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::School.def()
    }
}

impl Related<super::class_room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassRoom.def()
    }
}

impl Related<super::attention_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttentionEntry.def()
    }
}

impl Related<super::unrecognized_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UnrecognizedEntry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
