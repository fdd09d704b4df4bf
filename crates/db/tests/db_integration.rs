//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `museum_test`)
//!   `TEST_DB_PASSWORD` (default: `museum_test`)
//!   `TEST_DB_NAME` (default: `museum_test`)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use museum_common::AppError;
use museum_db::entities::{exhibit, exhibit_photo};
use museum_db::repositories::{
    BlockRepository, ExhibitPhotoRepository, ExhibitRepository, MuseumRepository,
    SectionRepository,
};
use museum_db::test_utils::{TestDatabase, TestDbConfig, fixtures};
use sea_orm::Set;

async fn migrated_database() -> TestDatabase {
    let db = TestDatabase::create_unique()
        .await
        .expect("Failed to create database");
    db.migrate().await.expect("Failed to migrate");
    db
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_unique_constraints_surface_as_conflicts() {
    let test_db = migrated_database().await;
    // `DatabaseConnection` is not `Clone` with sea-orm's `mock` feature; open a second pool to the same database.
    let conn = Arc::new(
        sea_orm::Database::connect(test_db.config.database_url())
            .await
            .expect("Failed to connect"),
    );

    let museums = MuseumRepository::new(conn.clone());
    let blocks = BlockRepository::new(conn.clone());
    let sections = SectionRepository::new(conn.clone());
    let exhibits = ExhibitRepository::new(conn.clone());
    let photos = ExhibitPhotoRepository::new(conn.clone());

    museums
        .create(fixtures::museum("m1", "ISC").into())
        .await
        .unwrap();
    blocks
        .create(fixtures::block("b1", "m1", "REN2").into())
        .await
        .unwrap();
    sections
        .create(fixtures::section("s1", "m1", "b1", 1).into())
        .await
        .unwrap();

    // Duplicate block code within the museum
    let duplicate = blocks
        .create(fixtures::block("b2", "m1", "REN2").into())
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let first = exhibits
        .insert_in_group("b1", "s1", |last| {
            assert_eq!(last, None);
            Ok(fixtures::exhibit("e1", "ISC-REN2-1.0001").into())
        })
        .await
        .unwrap();
    assert_eq!(first.sequence_no, 1);

    // Same sequence number in the same group
    let clash = exhibits
        .insert_in_group("b1", "s1", |_| {
            let model: exhibit::ActiveModel = fixtures::exhibit("e2", "ISC-REN2-1.0002").into();
            Ok(model)
        })
        .await;
    assert!(matches!(clash, Err(AppError::Conflict(_))));

    // Frames collide, gallery photos do not
    photos
        .create(fixtures::frame("p1", "e1", 1).into())
        .await
        .unwrap();
    let frame_clash = photos.create(fixtures::frame("p2", "e1", 1).into()).await;
    assert!(matches!(frame_clash, Err(AppError::Conflict(_))));

    for id in ["g1", "g2"] {
        let mut gallery: exhibit_photo::ActiveModel = fixtures::gallery_photo(id, "e1").into();
        gallery.frame_index = Set(None);
        photos.create(gallery).await.unwrap();
    }
    assert_eq!(photos.active_gallery("e1").await.unwrap().len(), 2);

    // Sections with exhibits cannot be deleted
    assert!(matches!(
        sections.delete("s1").await,
        Err(AppError::Conflict(_))
    ));

    // Exhibit deletion cascades to photos
    exhibits.delete("e1").await.unwrap();
    assert!(photos.find_by_exhibit("e1").await.unwrap().is_empty());

    drop((museums, blocks, sections, exhibits, photos, conn));
    test_db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
}
