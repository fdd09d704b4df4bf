//! Create exhibit_photo table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ExhibitPhoto::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExhibitPhoto::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExhibitPhoto::ExhibitId).string().not_null())
                    .col(
                        ColumnDef::new(ExhibitPhoto::Kind)
                            .string_len(16)
                            .not_null()
                            .default("frame"),
                    )
                    .col(
                        ColumnDef::new(ExhibitPhoto::FrameIndex)
                            .integer()
                            .null()
                            .check(Expr::col(ExhibitPhoto::FrameIndex).gte(1)),
                    )
                    .col(ColumnDef::new(ExhibitPhoto::Image).string().not_null())
                    .col(
                        ColumnDef::new(ExhibitPhoto::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ExhibitPhoto::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_exhibit_photo_exhibit")
                            .from(ExhibitPhoto::Table, ExhibitPhoto::ExhibitId)
                            .to(Exhibit::Table, Exhibit::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_exhibit_photo_exhibit_kind")
                    .table(ExhibitPhoto::Table)
                    .col(ExhibitPhoto::ExhibitId)
                    .col(ExhibitPhoto::Kind)
                    .to_owned(),
            )
            .await?;

        // Frame numbers are unique among frames only; gallery rows are exempt
        manager
            .get_connection()
            .execute_unprepared(
                r"
                CREATE UNIQUE INDEX IF NOT EXISTS uniq_360_frame_per_exhibit
                ON exhibit_photo (exhibit_id, frame_index)
                WHERE kind = 'frame';
                ",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExhibitPhoto::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ExhibitPhoto {
    Table,
    Id,
    ExhibitId,
    Kind,
    FrameIndex,
    Image,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum Exhibit {
    Table,
    Id,
}
