//! Exhibit photos: 360-degree frames and gallery images.

use chrono::Utc;
use museum_common::storage::keys;
use museum_common::{AppError, AppResult, IdGenerator, StorageService};
use museum_db::entities::exhibit;
use museum_db::entities::exhibit_photo::{self, PhotoKind};
use museum_db::repositories::{ExhibitPhotoRepository, ExhibitRepository};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// File name pattern of 360-degree frames as consumed by the viewer widget.
pub const FRAME_FILENAME_PATTERN: &str = "frame-{index}.webp";

/// Validate a photo's kind against its frame index.
///
/// Frames need a position of at least 1; gallery photos never keep one.
/// Returns the frame index to store.
pub fn classify(kind: PhotoKind, frame_index: Option<i32>) -> AppResult<Option<i32>> {
    match kind {
        PhotoKind::Frame => match frame_index {
            Some(index) if index >= 1 => Ok(Some(index)),
            Some(_) => Err(AppError::invalid_field(
                "frame_index",
                "Frame number must be at least 1",
            )),
            None => Err(AppError::invalid_field(
                "frame_index",
                "A frame number is required for 360 frames",
            )),
        },
        PhotoKind::Gallery => Ok(None),
    }
}

/// Public URL of the folder holding an exhibit's frames.
#[must_use]
pub fn frames_folder_url(storage: &StorageService, slug: &str) -> String {
    storage.public_url(&keys::frames_folder(slug))
}

/// Preview image of an exhibit for list cards.
///
/// 3D exhibits show their first frame, others the first active gallery
/// photo, then the single image. Empty when there is nothing to show.
#[must_use]
pub fn first_frame_url(
    storage: &StorageService,
    exhibit: &exhibit::Model,
    first_gallery: Option<&exhibit_photo::Model>,
) -> String {
    if exhibit.is_3d {
        let filename = FRAME_FILENAME_PATTERN.replace("{index}", "001");
        return format!("{}{filename}", frames_folder_url(storage, &exhibit.slug));
    }
    if let Some(photo) = first_gallery.filter(|p| !p.image.is_empty()) {
        return storage.public_url(&photo.image);
    }
    exhibit
        .single_image
        .as_deref()
        .filter(|key| !key.is_empty())
        .map(|key| storage.public_url(key))
        .unwrap_or_default()
}

/// Initialization data for the 360-degree viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ci360Manifest {
    pub slug: String,
    /// Number of active frames.
    pub frames: u64,
    pub folder: String,
    pub filename: String,
}

impl Ci360Manifest {
    #[must_use]
    pub fn new(storage: &StorageService, slug: &str, frames: u64) -> Self {
        Self {
            slug: slug.to_string(),
            frames,
            folder: frames_folder_url(storage, slug),
            filename: FRAME_FILENAME_PATTERN.to_string(),
        }
    }
}

/// Which photos of an exhibit to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoView {
    /// Active frames in rotation order.
    Frames,
    /// Active gallery photos in upload order.
    Gallery,
    /// Everything, including inactive photos.
    #[default]
    All,
}

/// Metadata of an uploaded photo.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePhotoInput {
    #[serde(default = "default_kind")]
    pub kind: PhotoKind,
    pub frame_index: Option<i32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_kind() -> PhotoKind {
    PhotoKind::Frame
}

const fn default_true() -> bool {
    true
}

/// Photo changes. Absent fields keep their value; switching to gallery
/// drops the frame index.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePhotoInput {
    pub kind: Option<PhotoKind>,
    pub frame_index: Option<i32>,
    pub is_active: Option<bool>,
}

/// File uploaded alongside a photo.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Service for managing exhibit photos.
#[derive(Clone)]
pub struct PhotoService {
    photo_repo: ExhibitPhotoRepository,
    exhibit_repo: ExhibitRepository,
    storage: StorageService,
    id_gen: IdGenerator,
}

impl PhotoService {
    /// Create a new photo service.
    #[must_use]
    pub const fn new(
        photo_repo: ExhibitPhotoRepository,
        exhibit_repo: ExhibitRepository,
        storage: StorageService,
    ) -> Self {
        Self {
            photo_repo,
            exhibit_repo,
            storage,
            id_gen: IdGenerator::new(),
        }
    }

    async fn exhibit(&self, exhibit_id: &str) -> AppResult<exhibit::Model> {
        self.exhibit_repo
            .find_by_id(exhibit_id)
            .await?
            .ok_or_else(|| AppError::ExhibitNotFound(exhibit_id.to_string()))
    }

    async fn ensure_frame_free(
        &self,
        exhibit_id: &str,
        frame_index: Option<i32>,
        photo_id: Option<&str>,
    ) -> AppResult<()> {
        let Some(index) = frame_index else {
            return Ok(());
        };
        match self.photo_repo.find_frame(exhibit_id, index).await? {
            Some(other) if Some(other.id.as_str()) != photo_id => Err(AppError::Conflict(
                format!("Frame {index} already exists for this exhibit"),
            )),
            _ => Ok(()),
        }
    }

    /// List photos of an exhibit.
    pub async fn list(
        &self,
        exhibit_id: &str,
        view: PhotoView,
    ) -> AppResult<Vec<exhibit_photo::Model>> {
        self.exhibit(exhibit_id).await?;
        match view {
            PhotoView::Frames => self.photo_repo.active_frames(exhibit_id).await,
            PhotoView::Gallery => self.photo_repo.active_gallery(exhibit_id).await,
            PhotoView::All => self.photo_repo.find_by_exhibit(exhibit_id).await,
        }
    }

    /// Get a photo by ID.
    pub async fn get(&self, id: &str) -> AppResult<exhibit_photo::Model> {
        self.photo_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Photo not found: {id}")))
    }

    /// Store an uploaded photo and record it.
    ///
    /// Frames are written under a private upload key and moved to their
    /// `frame-NNN` name once the row claiming that index is stored. A failed
    /// insert removes only its own upload.
    pub async fn create(
        &self,
        exhibit_id: &str,
        input: CreatePhotoInput,
        upload: PhotoUpload,
    ) -> AppResult<exhibit_photo::Model> {
        let exhibit = self.exhibit(exhibit_id).await?;
        let frame_index = classify(input.kind, input.frame_index)?;

        if input.kind == PhotoKind::Frame {
            self.ensure_frame_free(exhibit_id, frame_index, None).await?;
        }

        let stem = self.id_gen.generate_file_stem();
        let (upload_key, key) = match frame_index {
            Some(index) => (
                keys::staging(&exhibit.slug, &stem, &upload.file_name),
                keys::frame(&exhibit.slug, index, &upload.file_name),
            ),
            None => {
                let key = keys::gallery(&exhibit.slug, &stem, &upload.file_name);
                (key.clone(), key)
            }
        };
        self.storage
            .upload(&upload_key, &upload.data, &upload.content_type)
            .await?;

        let model = exhibit_photo::ActiveModel {
            id: Set(self.id_gen.generate()),
            exhibit_id: Set(exhibit_id.to_string()),
            kind: Set(input.kind),
            frame_index: Set(frame_index),
            image: Set(key.clone()),
            is_active: Set(input.is_active),
            created_at: Set(Utc::now()),
        };

        let photo = match self.photo_repo.create(model).await {
            Ok(photo) => photo,
            Err(e) => {
                self.discard(&upload_key).await;
                return Err(e);
            }
        };

        if upload_key != key {
            if let Err(e) = self.storage.rename(&upload_key, &key).await {
                if let Err(rollback) = self.photo_repo.delete(&photo.id).await {
                    warn!(photo_id = %photo.id, error = %rollback, "Failed to remove photo without file");
                }
                self.discard(&upload_key).await;
                return Err(e);
            }
        }

        info!(exhibit = %exhibit.slug, photo_id = %photo.id, kind = ?photo.kind, "Photo added");
        Ok(photo)
    }

    async fn discard(&self, key: &str) {
        if let Err(e) = self.storage.delete(key).await {
            warn!(key = %key, error = %e, "Failed to remove orphaned photo file");
        }
    }

    /// Update a photo. Kind and frame index are validated together.
    ///
    /// Changing either moves the stored file to the key matching the new
    /// kind and index.
    pub async fn update(
        &self,
        id: &str,
        input: UpdatePhotoInput,
    ) -> AppResult<exhibit_photo::Model> {
        let photo = self.get(id).await?;

        let kind = input.kind.unwrap_or(photo.kind);
        let requested_index = input.frame_index.or(photo.frame_index);
        let frame_index = classify(kind, requested_index)?;

        if kind == PhotoKind::Frame && frame_index != photo.frame_index {
            self.ensure_frame_free(&photo.exhibit_id, frame_index, Some(id))
                .await?;
        }

        let moved = if kind == photo.kind && frame_index == photo.frame_index {
            None
        } else {
            let exhibit = self.exhibit(&photo.exhibit_id).await?;
            let key = match frame_index {
                Some(index) => keys::frame(&exhibit.slug, index, &photo.image),
                None => keys::gallery(
                    &exhibit.slug,
                    &self.id_gen.generate_file_stem(),
                    &photo.image,
                ),
            };
            self.storage.rename(&photo.image, &key).await?;
            Some((photo.image.clone(), key))
        };

        let mut active: exhibit_photo::ActiveModel = photo.into();
        active.kind = Set(kind);
        active.frame_index = Set(frame_index);
        if let Some((_, key)) = &moved {
            active.image = Set(key.clone());
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }

        match self.photo_repo.update(active).await {
            Ok(photo) => Ok(photo),
            Err(e) => {
                if let Some((old, new)) = moved {
                    if let Err(restore) = self.storage.rename(&new, &old).await {
                        warn!(from = %new, to = %old, error = %restore, "Failed to restore moved photo file");
                    }
                }
                Err(e)
            }
        }
    }

    /// Delete a photo together with its stored file.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let photo = self.get(id).await?;
        self.photo_repo.delete(id).await?;
        if let Err(e) = self.storage.delete(&photo.image).await {
            warn!(photo_id = %id, key = %photo.image, error = %e, "Failed to remove photo file");
        }
        info!(photo_id = %id, "Photo deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use museum_common::{LocalStorage, NoOpStorage};
    use museum_db::test_utils::fixtures;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn storage() -> StorageService {
        Arc::new(NoOpStorage::new("/media".to_string()))
    }

    fn service(db: MockDatabase) -> PhotoService {
        service_with(db, storage())
    }

    fn service_with(db: MockDatabase, storage: StorageService) -> PhotoService {
        let db = Arc::new(db.into_connection());
        PhotoService::new(
            ExhibitPhotoRepository::new(db.clone()),
            ExhibitRepository::new(db),
            storage,
        )
    }

    fn upload(data: &[u8]) -> PhotoUpload {
        PhotoUpload {
            file_name: "IMG.webp".to_string(),
            content_type: "image/webp".to_string(),
            data: data.to_vec(),
        }
    }

    fn frame_input(index: i32) -> CreatePhotoInput {
        CreatePhotoInput {
            kind: PhotoKind::Frame,
            frame_index: Some(index),
            is_active: true,
        }
    }

    const FRAME_3: &str = "exhibits/ISC-REN2-1.0001/frames/frame-003.webp";
    const FRAME_5: &str = "exhibits/ISC-REN2-1.0001/frames/frame-005.webp";

    #[test]
    fn test_classify_frame_requires_index() {
        assert_eq!(classify(PhotoKind::Frame, Some(3)).unwrap(), Some(3));
        assert!(matches!(
            classify(PhotoKind::Frame, None),
            Err(AppError::InvalidField {
                field: "frame_index",
                ..
            })
        ));
        assert!(classify(PhotoKind::Frame, Some(0)).is_err());
    }

    #[test]
    fn test_classify_gallery_clears_index() {
        assert_eq!(classify(PhotoKind::Gallery, Some(5)).unwrap(), None);
        assert_eq!(classify(PhotoKind::Gallery, None).unwrap(), None);
    }

    #[test]
    fn test_first_frame_url() {
        let storage = storage();
        let mut e = fixtures::exhibit("e1", "ISC-REN2-1.0001");

        assert_eq!(first_frame_url(&storage, &e, None), "");

        e.single_image = Some("exhibits/ISC-REN2-1.0001/single/single.jpg".to_string());
        assert_eq!(
            first_frame_url(&storage, &e, None),
            "/media/exhibits/ISC-REN2-1.0001/single/single.jpg"
        );

        let gallery = fixtures::gallery_photo("g1", "e1");
        assert_eq!(
            first_frame_url(&storage, &e, Some(&gallery)),
            "/media/exhibits/x/gallery/g1.webp"
        );

        e.is_3d = true;
        assert_eq!(
            first_frame_url(&storage, &e, Some(&gallery)),
            "/media/exhibits/ISC-REN2-1.0001/frames/frame-001.webp"
        );
    }

    #[test]
    fn test_manifest() {
        let manifest = Ci360Manifest::new(&storage(), "ISC-REN2-1.0001", 36);
        assert_eq!(manifest.frames, 36);
        assert_eq!(manifest.folder, "/media/exhibits/ISC-REN2-1.0001/frames/");
        assert_eq!(manifest.filename, "frame-{index}.webp");
    }

    #[tokio::test]
    async fn test_create_frame() {
        let exhibit = fixtures::exhibit("e1", "ISC-REN2-1.0001");
        let mut frame = fixtures::frame("p1", "e1", 7);
        frame.image = "exhibits/ISC-REN2-1.0001/frames/frame-007.webp".to_string();

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[exhibit]])
                .append_query_results([Vec::<exhibit_photo::Model>::new()])
                .append_query_results([[frame]]),
        );

        let photo = service
            .create(
                "e1",
                CreatePhotoInput {
                    kind: PhotoKind::Frame,
                    frame_index: Some(7),
                    is_active: true,
                },
                PhotoUpload {
                    file_name: "IMG_7.webp".to_string(),
                    content_type: "image/webp".to_string(),
                    data: vec![0; 16],
                },
            )
            .await
            .unwrap();

        assert_eq!(photo.frame_index, Some(7));
        assert_eq!(
            photo.image,
            "exhibits/ISC-REN2-1.0001/frames/frame-007.webp"
        );
    }

    #[tokio::test]
    async fn test_create_duplicate_frame_conflicts() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::exhibit("e1", "ISC-REN2-1.0001")]])
                .append_query_results([[fixtures::frame("p1", "e1", 1)]]),
        );

        let result = service
            .create(
                "e1",
                CreatePhotoInput {
                    kind: PhotoKind::Frame,
                    frame_index: Some(1),
                    is_active: true,
                },
                PhotoUpload {
                    file_name: "a.webp".to_string(),
                    content_type: "image/webp".to_string(),
                    data: vec![],
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_frame_without_index_is_rejected() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::exhibit("e1", "ISC-REN2-1.0001")]]),
        );

        let result = service
            .create(
                "e1",
                CreatePhotoInput {
                    kind: PhotoKind::Frame,
                    frame_index: None,
                    is_active: true,
                },
                PhotoUpload {
                    file_name: "a.webp".to_string(),
                    content_type: "image/webp".to_string(),
                    data: vec![],
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(AppError::InvalidField {
                field: "frame_index",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_update_to_gallery_clears_index() {
        let frame = fixtures::frame("p1", "e1", 4);
        let mut updated = frame.clone();
        updated.kind = PhotoKind::Gallery;
        updated.frame_index = None;

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[frame]])
                .append_query_results([[fixtures::exhibit("e1", "ISC-REN2-1.0001")]])
                .append_query_results([[updated]]),
        );

        let photo = service
            .update(
                "p1",
                UpdatePhotoInput {
                    kind: Some(PhotoKind::Gallery),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(photo.kind, PhotoKind::Gallery);
        assert_eq!(photo.frame_index, None);
    }

    #[tokio::test]
    async fn test_renumbered_frame_keeps_its_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage: StorageService = Arc::new(LocalStorage::new(
            dir.path().to_path_buf(),
            "/media".to_string(),
        ));
        storage.upload(FRAME_3, b"photo-A", "image/webp").await.unwrap();

        let exhibit = fixtures::exhibit("e1", "ISC-REN2-1.0001");
        let mut a = fixtures::frame("pa", "e1", 3);
        a.image = FRAME_3.to_string();
        let mut a_moved = a.clone();
        a_moved.frame_index = Some(5);
        a_moved.image = FRAME_5.to_string();
        let mut b = fixtures::frame("pb", "e1", 3);
        b.image = FRAME_3.to_string();

        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                // update: photo, free index check, exhibit, saved row
                .append_query_results([[a]])
                .append_query_results([Vec::<exhibit_photo::Model>::new()])
                .append_query_results([[exhibit.clone()]])
                .append_query_results([[a_moved]])
                // create: exhibit, free index check, inserted row
                .append_query_results([[exhibit]])
                .append_query_results([Vec::<exhibit_photo::Model>::new()])
                .append_query_results([[b]]),
            storage.clone(),
        );

        service
            .update(
                "pa",
                UpdatePhotoInput {
                    frame_index: Some(5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(std::fs::read(dir.path().join(FRAME_5)).unwrap(), b"photo-A");
        assert!(!storage.exists(FRAME_3).await.unwrap());

        let created = service.create("e1", frame_input(3), upload(b"photo-B")).await.unwrap();
        assert_eq!(created.image, FRAME_3);
        assert_eq!(std::fs::read(dir.path().join(FRAME_3)).unwrap(), b"photo-B");
        assert_eq!(std::fs::read(dir.path().join(FRAME_5)).unwrap(), b"photo-A");

        let staged = dir.path().join("exhibits/ISC-REN2-1.0001/uploads");
        assert_eq!(std::fs::read_dir(staged).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_failed_frame_insert_leaves_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage: StorageService = Arc::new(LocalStorage::new(
            dir.path().to_path_buf(),
            "/media".to_string(),
        ));
        storage.upload(FRAME_3, b"winner", "image/webp").await.unwrap();

        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::exhibit("e1", "ISC-REN2-1.0001")]])
                .append_query_results([Vec::<exhibit_photo::Model>::new()])
                .append_query_errors([DbErr::Custom("insert failed".to_string())]),
            storage,
        );

        let result = service.create("e1", frame_input(3), upload(b"loser")).await;

        assert!(result.is_err());
        assert_eq!(std::fs::read(dir.path().join(FRAME_3)).unwrap(), b"winner");
        let staged = dir.path().join("exhibits/ISC-REN2-1.0001/uploads");
        assert_eq!(std::fs::read_dir(staged).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_delete_survives_storage_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut photo = fixtures::gallery_photo("g1", "e1");
        photo.image = "exhibits/ISC-REN2-1.0001/gallery/g1.webp".to_string();
        // A directory in place of the file makes removal fail
        std::fs::create_dir_all(dir.path().join(&photo.image)).unwrap();

        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[photo]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }]),
            Arc::new(LocalStorage::new(
                dir.path().to_path_buf(),
                "/media".to_string(),
            )),
        );

        assert!(service.delete("g1").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::gallery_photo("g1", "e1")]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }]),
        );

        assert!(service.delete("g1").await.is_ok());
    }
}
