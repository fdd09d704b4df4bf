//! Museum block entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A sub-area of a museum grouping sections.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "museum_block")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub museum_id: String,

    /// Block code, unique within its museum (e.g. `REN2`).
    pub slug: String,

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
    #[sea_orm(has_many = "super::museum_section::Entity")]
    Sections,
    #[sea_orm(has_many = "super::exhibit::Entity")]
    Exhibits,
}

impl Related<super::museum::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Museum.def()
    }
}

impl Related<super::museum_section::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sections.def()
    }
}

impl Related<super::exhibit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exhibits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
