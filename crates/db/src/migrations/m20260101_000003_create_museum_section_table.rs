//! Create museum_section table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MuseumSection::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MuseumSection::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MuseumSection::MuseumId).string().not_null())
                    .col(ColumnDef::new(MuseumSection::BlockId).string().null())
                    .col(
                        ColumnDef::new(MuseumSection::CodeNum)
                            .integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(MuseumSection::CodeNum).gte(0)),
                    )
                    .col(
                        ColumnDef::new(MuseumSection::TitleRu)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MuseumSection::TitleUz)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(MuseumSection::TitleEn)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(MuseumSection::DescriptionRu)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(MuseumSection::DescriptionUz)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(MuseumSection::DescriptionEn)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_museum_section_museum")
                            .from(MuseumSection::Table, MuseumSection::MuseumId)
                            .to(Museum::Table, Museum::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_museum_section_block")
                            .from(MuseumSection::Table, MuseumSection::BlockId)
                            .to(MuseumBlock::Table, MuseumBlock::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_museum_section_block_code")
                    .table(MuseumSection::Table)
                    .col(MuseumSection::BlockId)
                    .col(MuseumSection::CodeNum)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MuseumSection::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MuseumSection {
    Table,
    Id,
    MuseumId,
    BlockId,
    CodeNum,
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

#[derive(Iden)]
enum MuseumBlock {
    Table,
    Id,
}
