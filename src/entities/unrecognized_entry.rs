use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "unrecognized_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(skip_deserializing)]
    pub id: Uuid,
    pub report_id: Uuid,
    pub attention: i32,
    pub inattention: i32,
    pub image_path: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lesson_report::Entity",
        from = "Column::ReportId",
        to = "super::lesson_report::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    LessonReport,
}

impl Related<super::lesson_report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LessonReport.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
