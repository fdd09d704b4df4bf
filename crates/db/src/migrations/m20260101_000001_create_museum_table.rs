//! Create museum table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Museum::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Museum::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Museum::Slug)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Museum::TitleRu).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Museum::TitleUz)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Museum::TitleEn)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Museum::DescriptionRu)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Museum::DescriptionUz)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Museum::DescriptionEn)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Museum::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Museum {
    Table,
    Id,
    Slug,
    TitleRu,
    TitleUz,
    TitleEn,
    DescriptionRu,
    DescriptionUz,
    DescriptionEn,
}
