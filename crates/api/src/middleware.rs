//! Application state shared by all handlers.

#![allow(missing_docs)]

use std::sync::Arc;

use museum_common::{Config, StorageService};
use museum_core::{
    BlockService, ExhibitService, Language, MuseumService, PhotoService, QrRenderer,
    SectionService,
};
use museum_db::repositories::{
    BlockRepository, ExhibitPhotoRepository, ExhibitRepository, MuseumRepository,
    SectionRepository,
};
use sea_orm::DatabaseConnection;
use tracing::warn;

/// Interface language settings resolved from configuration.
#[derive(Debug, Clone)]
pub struct LanguageSettings {
    pub default_language: Language,
    pub cookie_name: String,
}

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub museum_service: MuseumService,
    pub block_service: BlockService,
    pub section_service: SectionService,
    pub exhibit_service: ExhibitService,
    pub photo_service: PhotoService,
    pub language: Arc<LanguageSettings>,
    /// Page size of admin lists.
    pub page_size: u64,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    pub fn new(
        db: Arc<DatabaseConnection>,
        storage: StorageService,
        qr: Arc<dyn QrRenderer>,
        config: &Config,
    ) -> Self {
        let museum_repo = MuseumRepository::new(Arc::clone(&db));
        let block_repo = BlockRepository::new(Arc::clone(&db));
        let section_repo = SectionRepository::new(Arc::clone(&db));
        let exhibit_repo = ExhibitRepository::new(Arc::clone(&db));
        let photo_repo = ExhibitPhotoRepository::new(db);

        let default_language = Language::parse(&config.i18n.default_language).unwrap_or_else(|| {
            warn!(
                language = %config.i18n.default_language,
                "Unsupported default language, using ru"
            );
            Language::Ru
        });

        Self {
            museum_service: MuseumService::new(museum_repo.clone()),
            block_service: BlockService::new(block_repo.clone(), museum_repo.clone()),
            section_service: SectionService::new(
                section_repo.clone(),
                block_repo.clone(),
                exhibit_repo.clone(),
            ),
            exhibit_service: ExhibitService::new(
                exhibit_repo.clone(),
                museum_repo,
                block_repo,
                section_repo,
                photo_repo.clone(),
                storage.clone(),
                qr,
                &config.catalog,
            ),
            photo_service: PhotoService::new(photo_repo, exhibit_repo, storage),
            language: Arc::new(LanguageSettings {
                default_language,
                cookie_name: config.i18n.cookie_name.clone(),
            }),
            page_size: config.catalog.page_size.max(1),
        }
    }
}
