//! Museum section repository.

use std::sync::Arc;

use museum_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select,
};

use super::{non_blank, search_condition};
use crate::entities::{MuseumSection, museum_section};

/// Filters for the admin section list.
#[derive(Debug, Clone, Default)]
pub struct SectionFilter {
    pub museum_id: Option<String>,
    pub block_id: Option<String>,
    pub search: Option<String>,
}

/// Repository for museum section operations.
#[derive(Clone)]
pub struct SectionRepository {
    db: Arc<DatabaseConnection>,
}

fn title_search(query: Select<MuseumSection>, search: Option<&str>) -> Select<MuseumSection> {
    match non_blank(search) {
        Some(q) => query.filter(search_condition(
            MuseumSection,
            [
                museum_section::Column::TitleRu,
                museum_section::Column::TitleUz,
                museum_section::Column::TitleEn,
            ],
            q,
        )),
        None => query,
    }
}

impl SectionRepository {
    /// Create a new section repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a section by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<museum_section::Model>> {
        MuseumSection::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn filtered(filter: &SectionFilter) -> Select<MuseumSection> {
        let mut query = MuseumSection::find();
        if let Some(museum_id) = &filter.museum_id {
            query = query.filter(museum_section::Column::MuseumId.eq(museum_id.as_str()));
        }
        if let Some(block_id) = &filter.block_id {
            query = query.filter(museum_section::Column::BlockId.eq(block_id.as_str()));
        }
        title_search(query, filter.search.as_deref())
    }

    /// List sections ordered by block, then exhibition number.
    pub async fn list(
        &self,
        filter: &SectionFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<museum_section::Model>> {
        Self::filtered(filter)
            .order_by_asc(museum_section::Column::BlockId)
            .order_by_asc(museum_section::Column::CodeNum)
            .order_by_asc(museum_section::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count sections matching the filters.
    pub async fn count(&self, filter: &SectionFilter) -> AppResult<u64> {
        Self::filtered(filter)
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All sections of a block ordered by exhibition number.
    pub async fn find_by_block(&self, block_id: &str) -> AppResult<Vec<museum_section::Model>> {
        MuseumSection::find()
            .filter(museum_section::Column::BlockId.eq(block_id))
            .order_by_asc(museum_section::Column::CodeNum)
            .order_by_asc(museum_section::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Section picker lookup: optionally limited to a block, matched on titles.
    pub async fn autocomplete(
        &self,
        block_id: Option<&str>,
        search: Option<&str>,
        limit: u64,
    ) -> AppResult<Vec<museum_section::Model>> {
        let mut query = MuseumSection::find();
        if let Some(block_id) = block_id {
            query = query.filter(museum_section::Column::BlockId.eq(block_id));
        }
        title_search(query, search)
            .order_by_asc(museum_section::Column::CodeNum)
            .order_by_asc(museum_section::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new section.
    pub async fn create(
        &self,
        model: museum_section::ActiveModel,
    ) -> AppResult<museum_section::Model> {
        model.insert(self.db.as_ref()).await.map_err(AppError::from)
    }

    /// Update a section.
    pub async fn update(
        &self,
        model: museum_section::ActiveModel,
    ) -> AppResult<museum_section::Model> {
        model.update(self.db.as_ref()).await.map_err(AppError::from)
    }

    /// Delete a section. Fails with a conflict while exhibits reference it.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        MuseumSection::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from)?;
        Ok(())
    }
}
