//! `SeaORM` Entity for rooms table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub number: String,
    pub category_id: Uuid,
    pub capacity: i32,
    pub status: String,
    pub extensions: Json,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::room_categories::Entity",
        from = "Column::CategoryId",
        to = "super::room_categories::Column::Id"
    )]
    RoomCategories,
    #[sea_orm(has_many = "super::room_blocks::Entity")]
    RoomBlocks,
}

impl Related<super::room_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoomCategories.def()
    }
}

impl Related<super::room_blocks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoomBlocks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
