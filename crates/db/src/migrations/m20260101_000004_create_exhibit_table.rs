//! Create exhibit table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Optional single-line text column, empty by default.
fn title_col(col: Exhibit) -> ColumnDef {
    ColumnDef::new(col)
        .string_len(255)
        .not_null()
        .default("")
        .to_owned()
}

/// Optional long text column, empty by default.
fn text_col(col: Exhibit) -> ColumnDef {
    ColumnDef::new(col).text().not_null().default("").to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Exhibit::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Exhibit::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Exhibit::BlockId).string().not_null())
                    .col(ColumnDef::new(Exhibit::SectionId).string().not_null())
                    .col(
                        ColumnDef::new(Exhibit::Slug)
                            .string_len(crate::entities::exhibit::SLUG_MAX_LEN)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Exhibit::SequenceNo)
                            .integer()
                            .not_null()
                            .check(Expr::col(Exhibit::SequenceNo).gt(0)),
                    )
                    .col(ColumnDef::new(Exhibit::QrCode).string().null())
                    .col(ColumnDef::new(Exhibit::TitleRu).string_len(255).not_null())
                    .col(&mut title_col(Exhibit::TitleUz))
                    .col(&mut title_col(Exhibit::TitleEn))
                    .col(&mut title_col(Exhibit::TitleAr))
                    .col(&mut title_col(Exhibit::SubTitleRu))
                    .col(&mut title_col(Exhibit::SubTitleUz))
                    .col(&mut title_col(Exhibit::SubTitleEn))
                    .col(&mut title_col(Exhibit::SubTitleAr))
                    .col(&mut text_col(Exhibit::DescriptionRu))
                    .col(&mut text_col(Exhibit::DescriptionUz))
                    .col(&mut text_col(Exhibit::DescriptionEn))
                    .col(&mut text_col(Exhibit::DescriptionAr))
                    .col(ColumnDef::new(Exhibit::AudioRu).string().null())
                    .col(ColumnDef::new(Exhibit::AudioUz).string().null())
                    .col(ColumnDef::new(Exhibit::AudioEn).string().null())
                    .col(ColumnDef::new(Exhibit::SingleImage).string().null())
                    .col(
                        ColumnDef::new(Exhibit::Is3d)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Exhibit::FramesRequired)
                            .integer()
                            .not_null()
                            .default(36)
                            .check(Expr::col(Exhibit::FramesRequired).gte(8)),
                    )
                    .col(
                        ColumnDef::new(Exhibit::IsPublished)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Exhibit::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Exhibit::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_exhibit_block")
                            .from(Exhibit::Table, Exhibit::BlockId)
                            .to(MuseumBlock::Table, MuseumBlock::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_exhibit_section")
                            .from(Exhibit::Table, Exhibit::SectionId)
                            .to(MuseumSection::Table, MuseumSection::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Backstop for concurrent identity assignment in one group
        manager
            .create_index(
                Index::create()
                    .name("idx_exhibit_block_section_sequence")
                    .table(Exhibit::Table)
                    .col(Exhibit::BlockId)
                    .col(Exhibit::SectionId)
                    .col(Exhibit::SequenceNo)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_exhibit_section_id")
                    .table(Exhibit::Table)
                    .col(Exhibit::SectionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_exhibit_is_published")
                    .table(Exhibit::Table)
                    .col(Exhibit::IsPublished)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Exhibit::Table).to_owned())
            .await
    }
}

#[derive(Iden, Clone, Copy)]
enum Exhibit {
    Table,
    Id,
    BlockId,
    SectionId,
    Slug,
    SequenceNo,
    QrCode,
    TitleRu,
    TitleUz,
    TitleEn,
    TitleAr,
    SubTitleRu,
    SubTitleUz,
    SubTitleEn,
    SubTitleAr,
    DescriptionRu,
    DescriptionUz,
    DescriptionEn,
    DescriptionAr,
    AudioRu,
    AudioUz,
    AudioEn,
    SingleImage,
    #[iden = "is_3d"]
    Is3d,
    FramesRequired,
    IsPublished,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum MuseumBlock {
    Table,
    Id,
}

#[derive(Iden)]
enum MuseumSection {
    Table,
    Id,
}
