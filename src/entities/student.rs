use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub class_id: i32,
    pub full_name: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
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

impl ActiveModelBehavior for ActiveModel {}
