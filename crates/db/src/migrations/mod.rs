//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20260101_000001_create_museum_table;
mod m20260101_000002_create_museum_block_table;
mod m20260101_000003_create_museum_section_table;
mod m20260101_000004_create_exhibit_table;
mod m20260101_000005_create_exhibit_photo_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_create_museum_table::Migration),
            Box::new(m20260101_000002_create_museum_block_table::Migration),
            Box::new(m20260101_000003_create_museum_section_table::Migration),
            Box::new(m20260101_000004_create_exhibit_table::Migration),
            Box::new(m20260101_000005_create_exhibit_photo_table::Migration),
        ]
    }
}
