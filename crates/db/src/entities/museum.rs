//! Museum entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A museum, the root of the catalog hierarchy.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "museum")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Museum code used in exhibit slugs and URLs (e.g. `ISC`).
    #[sea_orm(unique)]
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
    #[sea_orm(has_many = "super::museum_block::Entity")]
    Blocks,
    #[sea_orm(has_many = "super::museum_section::Entity")]
    Sections,
}

impl Related<super::museum_block::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Blocks.def()
    }
}

impl Related<super::museum_section::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sections.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
