//! Museum section entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A numbered exhibition zone within a block.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "museum_section")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub museum_id: String,

    /// Owning block. Rows created before blocks existed have none.
    #[sea_orm(indexed, nullable)]
    pub block_id: Option<String>,

    /// Exhibition number, the third part of exhibit slugs.
    pub code_num: i32,

    pub title_ru: String,
    pub title_uz: String,
    pub title_en: String,

    #[sea_orm(column_type = "Text")]
    pub description_ru: String,
    #[sea_orm(column_type = "Text")]
    pub description_uz: String,
    #[sea_orm(column_type = "Text")]
    pub description_en: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::museum::Entity",
        from = "Column::MuseumId",
        to = "super::museum::Column::Id",
        on_delete = "Cascade"
    )]
    Museum,
    #[sea_orm(
        belongs_to = "super::museum_block::Entity",
        from = "Column::BlockId",
        to = "super::museum_block::Column::Id",
        on_delete = "Cascade"
    )]
    Block,
    #[sea_orm(has_many = "super::exhibit::Entity")]
    Exhibits,
}

impl Related<super::museum::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Museum.def()
    }
}

impl Related<super::museum_block::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Block.def()
    }
}

impl Related<super::exhibit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exhibits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
