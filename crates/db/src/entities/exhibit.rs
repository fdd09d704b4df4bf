//! Exhibit entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Default number of frames expected for a 360-degree exhibit.
pub const DEFAULT_FRAMES_REQUIRED: i32 = 36;

/// Smallest accepted frame count for a 360-degree exhibit.
pub const MIN_FRAMES_REQUIRED: i32 = 8;

/// Width of the `slug` column. Holds two 32-character codes, two
/// ten-digit numbers and the separators.
pub const SLUG_MAX_LEN: u32 = 96;

/// A single displayed item.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "exhibit")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub block_id: String,

    #[sea_orm(indexed)]
    pub section_id: String,

    /// Generated code, e.g. `ISC-REN2-1.0001`.
    #[sea_orm(unique)]
    pub slug: String,

    /// Position within the (block, section) group, starting at 1.
    pub sequence_no: i32,

    /// Storage key of the generated QR label.
    #[sea_orm(nullable)]
    pub qr_code: Option<String>,

    pub title_ru: String,
    pub title_uz: String,
    pub title_en: String,
    pub title_ar: String,

    pub sub_title_ru: String,
    pub sub_title_uz: String,
    pub sub_title_en: String,
    pub sub_title_ar: String,

    #[sea_orm(column_type = "Text")]
    pub description_ru: String,
    #[sea_orm(column_type = "Text")]
    pub description_uz: String,
    #[sea_orm(column_type = "Text")]
    pub description_en: String,
    #[sea_orm(column_type = "Text")]
    pub description_ar: String,

    /// Storage keys of the narration tracks.
    #[sea_orm(nullable)]
    pub audio_ru: Option<String>,
    #[sea_orm(nullable)]
    pub audio_uz: Option<String>,
    #[sea_orm(nullable)]
    pub audio_en: Option<String>,

    /// Storage key of the flat display photo.
    #[sea_orm(nullable)]
    pub single_image: Option<String>,

    /// Whether the exhibit is shown as a 360-degree rotation.
    pub is_3d: bool,

    pub frames_required: i32,

    pub is_published: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::museum_block::Entity",
        from = "Column::BlockId",
        to = "super::museum_block::Column::Id",
        on_delete = "Restrict"
    )]
    Block,
    #[sea_orm(
        belongs_to = "super::museum_section::Entity",
        from = "Column::SectionId",
        to = "super::museum_section::Column::Id",
        on_delete = "Restrict"
    )]
    Section,
    #[sea_orm(has_many = "super::exhibit_photo::Entity")]
    Photos,
}

impl Related<super::museum_block::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Block.def()
    }
}

impl Related<super::museum_section::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Section.def()
    }
}

impl Related<super::exhibit_photo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Photos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
