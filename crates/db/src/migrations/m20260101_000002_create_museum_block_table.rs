//! Create museum_block table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MuseumBlock::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MuseumBlock::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MuseumBlock::MuseumId).string().not_null())
                    .col(ColumnDef::new(MuseumBlock::Slug).string_len(32).not_null())
                    .col(
                        ColumnDef::new(MuseumBlock::TitleRu)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MuseumBlock::TitleUz)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(MuseumBlock::TitleEn)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(MuseumBlock::DescriptionRu)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(MuseumBlock::DescriptionUz)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(MuseumBlock::DescriptionEn)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_museum_block_museum")
                            .from(MuseumBlock::Table, MuseumBlock::MuseumId)
                            .to(Museum::Table, Museum::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Block codes are unique per museum
        manager
            .create_index(
                Index::create()
                    .name("idx_museum_block_museum_slug")
                    .table(MuseumBlock::Table)
                    .col(MuseumBlock::MuseumId)
                    .col(MuseumBlock::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MuseumBlock::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MuseumBlock {
    Table,
    Id,
    MuseumId,
    Slug,
    TitleRu,
    TitleUz,
    TitleEn,
    DescriptionRu,
    DescriptionUz,
    DescriptionEn,
}

#[derive(Iden)]
enum Museum {
    Table,
    Id,
}
