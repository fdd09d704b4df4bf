//! Museum repository.

use std::sync::Arc;

use museum_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select,
};

use super::{non_blank, search_condition};
use crate::entities::{Museum, museum};

/// Repository for museum operations.
#[derive(Clone)]
pub struct MuseumRepository {
    db: Arc<DatabaseConnection>,
}

impl MuseumRepository {
    /// Create a new museum repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a museum by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<museum::Model>> {
        Museum::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a museum by its code.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<museum::Model>> {
        Museum::find()
            .filter(museum::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn search(search: Option<&str>) -> Select<Museum> {
        let mut query = Museum::find();
        if let Some(q) = non_blank(search) {
            query = query.filter(search_condition(
                Museum,
                [
                    museum::Column::Slug,
                    museum::Column::TitleRu,
                    museum::Column::TitleUz,
                    museum::Column::TitleEn,
                ],
                q,
            ));
        }
        query
    }

    /// List museums ordered by code.
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<museum::Model>> {
        Self::search(search)
            .order_by_asc(museum::Column::Slug)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count museums matching a search.
    pub async fn count(&self, search: Option<&str>) -> AppResult<u64> {
        Self::search(search)
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new museum. A taken code is reported as a conflict.
    pub async fn create(&self, model: museum::ActiveModel) -> AppResult<museum::Model> {
        model.insert(self.db.as_ref()).await.map_err(AppError::from)
    }

    /// Update a museum.
    pub async fn update(&self, model: museum::ActiveModel) -> AppResult<museum::Model> {
        model.update(self.db.as_ref()).await.map_err(AppError::from)
    }

    /// Delete a museum together with its blocks and sections.
    ///
    /// Fails with a conflict while exhibits still reference its blocks.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Museum::delete_by_id(id)
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
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn create_test_museum(id: &str, slug: &str) -> museum::Model {
        museum::Model {
            id: id.to_string(),
            slug: slug.to_string(),
            title_ru: "Центр исламской цивилизации".to_string(),
            title_uz: String::new(),
            title_en: "Islamic Civilization Center".to_string(),
            description_ru: String::new(),
            description_uz: String::new(),
            description_en: String::new(),
        }
    }

    #[tokio::test]
    async fn test_find_by_slug() {
        let museum = create_test_museum("m1", "ISC");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[museum]])
                .into_connection(),
        );

        let repo = MuseumRepository::new(db);
        let result = repo.find_by_slug("ISC").await.unwrap();

        assert_eq!(result.unwrap().id, "m1");
    }

    #[tokio::test]
    async fn test_find_by_slug_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<museum::Model>::new()])
                .into_connection(),
        );

        let repo = MuseumRepository::new(db);
        assert!(repo.find_by_slug("NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_with_search() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_museum("m1", "ISC"),
                    create_test_museum("m2", "ISC2"),
                ]])
                .into_connection(),
        );

        let repo = MuseumRepository::new(db.clone());
        let result = repo.list(Some("isc"), 20, 0).await.unwrap();
        assert_eq!(result.len(), 2);
        drop(repo);

        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let sql = format!("{log:?}");
        assert!(sql.contains("ILIKE"));
    }

    #[tokio::test]
    async fn test_create() {
        let museum = create_test_museum("m1", "ISC");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[museum.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = MuseumRepository::new(db);
        let model = museum::ActiveModel {
            id: Set("m1".to_string()),
            slug: Set("ISC".to_string()),
            title_ru: Set(museum.title_ru.clone()),
            title_uz: Set(String::new()),
            title_en: Set(museum.title_en.clone()),
            description_ru: Set(String::new()),
            description_uz: Set(String::new()),
            description_en: Set(String::new()),
        };

        let result = repo.create(model).await.unwrap();
        assert_eq!(result.slug, "ISC");
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

        let repo = MuseumRepository::new(db);
        assert!(repo.delete("m1").await.is_ok());
    }
}
