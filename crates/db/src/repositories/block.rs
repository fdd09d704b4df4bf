//! Museum block repository.

use std::sync::Arc;

use museum_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select,
};

use super::{non_blank, search_condition};
use crate::entities::{MuseumBlock, museum_block};

/// Repository for museum block operations.
#[derive(Clone)]
pub struct BlockRepository {
    db: Arc<DatabaseConnection>,
}

impl BlockRepository {
    /// Create a new block repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a block by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<museum_block::Model>> {
        MuseumBlock::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a block by museum and code.
    pub async fn find_by_museum_and_slug(
        &self,
        museum_id: &str,
        slug: &str,
    ) -> AppResult<Option<museum_block::Model>> {
        MuseumBlock::find()
            .filter(museum_block::Column::MuseumId.eq(museum_id))
            .filter(museum_block::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find all blocks of a museum in creation order.
    pub async fn find_by_museum(&self, museum_id: &str) -> AppResult<Vec<museum_block::Model>> {
        MuseumBlock::find()
            .filter(museum_block::Column::MuseumId.eq(museum_id))
            .order_by_asc(museum_block::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn search(museum_id: Option<&str>, search: Option<&str>) -> Select<MuseumBlock> {
        let mut query = MuseumBlock::find();
        if let Some(museum_id) = museum_id {
            query = query.filter(museum_block::Column::MuseumId.eq(museum_id));
        }
        if let Some(q) = non_blank(search) {
            query = query.filter(search_condition(
                MuseumBlock,
                [
                    museum_block::Column::Slug,
                    museum_block::Column::TitleRu,
                    museum_block::Column::TitleUz,
                    museum_block::Column::TitleEn,
                ],
                q,
            ));
        }
        query
    }

    /// List blocks, optionally restricted to one museum.
    pub async fn list(
        &self,
        museum_id: Option<&str>,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<museum_block::Model>> {
        Self::search(museum_id, search)
            .order_by_asc(museum_block::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count blocks matching the filters.
    pub async fn count(&self, museum_id: Option<&str>, search: Option<&str>) -> AppResult<u64> {
        Self::search(museum_id, search)
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new block. A code already used in the museum is a conflict.
    pub async fn create(&self, model: museum_block::ActiveModel) -> AppResult<museum_block::Model> {
        model.insert(self.db.as_ref()).await.map_err(AppError::from)
    }

    /// Update a block.
    pub async fn update(&self, model: museum_block::ActiveModel) -> AppResult<museum_block::Model> {
        model.update(self.db.as_ref()).await.map_err(AppError::from)
    }

    /// Delete a block and its sections.
    ///
    /// Fails with a conflict while exhibits still reference it.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        MuseumBlock::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_block(id: &str, museum_id: &str, slug: &str) -> museum_block::Model {
        museum_block::Model {
            id: id.to_string(),
            museum_id: museum_id.to_string(),
            slug: slug.to_string(),
            title_ru: "Ренессанс".to_string(),
            title_uz: String::new(),
            title_en: String::new(),
            description_ru: String::new(),
            description_uz: String::new(),
            description_en: String::new(),
        }
    }

    #[tokio::test]
    async fn test_find_by_museum_and_slug() {
        let block = create_test_block("b1", "m1", "REN2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[block]])
                .into_connection(),
        );

        let repo = BlockRepository::new(db);
        let result = repo.find_by_museum_and_slug("m1", "REN2").await.unwrap();

        assert_eq!(result.unwrap().id, "b1");
    }

    #[tokio::test]
    async fn test_list_by_museum() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_block("b1", "m1", "REN1"),
                    create_test_block("b2", "m1", "REN2"),
                ]])
                .into_connection(),
        );

        let repo = BlockRepository::new(db);
        let result = repo.list(Some("m1"), None, 20, 0).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[1].slug, "REN2");
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = BlockRepository::new(db);
        assert!(repo.delete("b1").await.is_ok());
    }
}
