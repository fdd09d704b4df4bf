//! Exhibit photo entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of a photo within its exhibit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum PhotoKind {
    /// One ordered image of a 360-degree rotation.
    #[sea_orm(string_value = "frame")]
    Frame,
    /// Unordered supplementary image.
    #[sea_orm(string_value = "gallery")]
    Gallery,
}

/// A photo attached to an exhibit.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "exhibit_photo")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub exhibit_id: String,

    pub kind: PhotoKind,

    /// Position in the rotation, starting at 1. Only set for frames.
    #[sea_orm(nullable)]
    pub frame_index: Option<i32>,

    /// Storage key of the image file.
    pub image: String,

    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exhibit::Entity",
        from = "Column::ExhibitId",
        to = "super::exhibit::Column::Id",
        on_delete = "Cascade"
    )]
    Exhibit,
}

impl Related<super::exhibit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exhibit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
