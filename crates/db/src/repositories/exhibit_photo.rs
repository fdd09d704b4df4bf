//! Exhibit photo repository.

use std::collections::HashMap;
use std::sync::Arc;

use museum_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::entities::{ExhibitPhoto, exhibit_photo, exhibit_photo::PhotoKind};

/// Repository for exhibit photo operations.
#[derive(Clone)]
pub struct ExhibitPhotoRepository {
    db: Arc<DatabaseConnection>,
}

impl ExhibitPhotoRepository {
    /// Create a new photo repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a photo by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<exhibit_photo::Model>> {
        ExhibitPhoto::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All photos of an exhibit, frames first in rotation order.
    pub async fn find_by_exhibit(&self, exhibit_id: &str) -> AppResult<Vec<exhibit_photo::Model>> {
        ExhibitPhoto::find()
            .filter(exhibit_photo::Column::ExhibitId.eq(exhibit_id))
            .order_by_asc(exhibit_photo::Column::Kind)
            .order_by_asc(exhibit_photo::Column::FrameIndex)
            .order_by_asc(exhibit_photo::Column::CreatedAt)
            .order_by_asc(exhibit_photo::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Active frames ordered by frame index.
    pub async fn active_frames(&self, exhibit_id: &str) -> AppResult<Vec<exhibit_photo::Model>> {
        ExhibitPhoto::find()
            .filter(exhibit_photo::Column::ExhibitId.eq(exhibit_id))
            .filter(exhibit_photo::Column::Kind.eq(PhotoKind::Frame))
            .filter(exhibit_photo::Column::IsActive.eq(true))
            .order_by_asc(exhibit_photo::Column::FrameIndex)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Active gallery photos ordered by upload time.
    pub async fn active_gallery(&self, exhibit_id: &str) -> AppResult<Vec<exhibit_photo::Model>> {
        ExhibitPhoto::find()
            .filter(exhibit_photo::Column::ExhibitId.eq(exhibit_id))
            .filter(exhibit_photo::Column::Kind.eq(PhotoKind::Gallery))
            .filter(exhibit_photo::Column::IsActive.eq(true))
            .order_by_asc(exhibit_photo::Column::CreatedAt)
            .order_by_asc(exhibit_photo::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Number of active frames of an exhibit.
    pub async fn count_active_frames(&self, exhibit_id: &str) -> AppResult<u64> {
        ExhibitPhoto::find()
            .filter(exhibit_photo::Column::ExhibitId.eq(exhibit_id))
            .filter(exhibit_photo::Column::Kind.eq(PhotoKind::Frame))
            .filter(exhibit_photo::Column::IsActive.eq(true))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Active frame counts for a page of exhibits. Exhibits without frames are absent.
    pub async fn count_active_frames_by_exhibits(
        &self,
        exhibit_ids: &[String],
    ) -> AppResult<HashMap<String, u64>> {
        #[derive(FromQueryResult)]
        struct FrameCount {
            exhibit_id: String,
            frames: i64,
        }

        if exhibit_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = ExhibitPhoto::find()
            .filter(exhibit_photo::Column::ExhibitId.is_in(exhibit_ids.iter().cloned()))
            .filter(exhibit_photo::Column::Kind.eq(PhotoKind::Frame))
            .filter(exhibit_photo::Column::IsActive.eq(true))
            .select_only()
            .column(exhibit_photo::Column::ExhibitId)
            .column_as(exhibit_photo::Column::Id.count(), "frames")
            .group_by(exhibit_photo::Column::ExhibitId)
            .into_model::<FrameCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|r| (r.exhibit_id, u64::try_from(r.frames).unwrap_or(0)))
            .collect())
    }

    /// First active gallery photo of each exhibit in a page.
    pub async fn first_gallery_by_exhibits(
        &self,
        exhibit_ids: &[String],
    ) -> AppResult<HashMap<String, exhibit_photo::Model>> {
        if exhibit_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let photos = ExhibitPhoto::find()
            .filter(exhibit_photo::Column::ExhibitId.is_in(exhibit_ids.iter().cloned()))
            .filter(exhibit_photo::Column::Kind.eq(PhotoKind::Gallery))
            .filter(exhibit_photo::Column::IsActive.eq(true))
            .order_by_asc(exhibit_photo::Column::ExhibitId)
            .order_by_asc(exhibit_photo::Column::CreatedAt)
            .order_by_asc(exhibit_photo::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut first = HashMap::new();
        for photo in photos {
            first.entry(photo.exhibit_id.clone()).or_insert(photo);
        }
        Ok(first)
    }

    /// Find the frame occupying a position of an exhibit's rotation.
    pub async fn find_frame(
        &self,
        exhibit_id: &str,
        frame_index: i32,
    ) -> AppResult<Option<exhibit_photo::Model>> {
        ExhibitPhoto::find()
            .filter(exhibit_photo::Column::ExhibitId.eq(exhibit_id))
            .filter(exhibit_photo::Column::Kind.eq(PhotoKind::Frame))
            .filter(exhibit_photo::Column::FrameIndex.eq(frame_index))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a photo. A taken frame position is reported as a conflict.
    pub async fn create(&self, model: exhibit_photo::ActiveModel) -> AppResult<exhibit_photo::Model> {
        model.insert(self.db.as_ref()).await.map_err(AppError::from)
    }

    /// Update a photo.
    pub async fn update(&self, model: exhibit_photo::ActiveModel) -> AppResult<exhibit_photo::Model> {
        model.update(self.db.as_ref()).await.map_err(AppError::from)
    }

    /// Delete a photo row.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        ExhibitPhoto::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
