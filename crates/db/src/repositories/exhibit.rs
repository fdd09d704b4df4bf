//! Exhibit repository.

use std::sync::Arc;

use museum_common::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
    TransactionTrait,
};

use super::{non_blank, search_condition};
use crate::entities::{Exhibit, exhibit, museum_block};

/// Filters shared by the admin list and the public list.
#[derive(Debug, Clone, Default)]
pub struct ExhibitFilter {
    pub is_published: Option<bool>,
    pub is_3d: Option<bool>,
    pub museum_id: Option<String>,
    pub block_id: Option<String>,
    pub section_id: Option<String>,
    pub search: Option<String>,
}

impl ExhibitFilter {
    /// Filter matching only what visitors may see.
    #[must_use]
    pub fn published() -> Self {
        Self {
            is_published: Some(true),
            ..Default::default()
        }
    }
}

/// Repository for exhibit operations.
#[derive(Clone)]
pub struct ExhibitRepository {
    db: Arc<DatabaseConnection>,
}

impl ExhibitRepository {
    /// Create a new exhibit repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an exhibit by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<exhibit::Model>> {
        Exhibit::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find exhibits by IDs, ordered by slug.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<exhibit::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        Exhibit::find()
            .filter(exhibit::Column::Id.is_in(ids.iter().cloned()))
            .order_by_asc(exhibit::Column::Slug)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an exhibit by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<exhibit::Model>> {
        Exhibit::find()
            .filter(exhibit::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a published exhibit by slug.
    pub async fn find_published_by_slug(&self, slug: &str) -> AppResult<Option<exhibit::Model>> {
        Exhibit::find()
            .filter(exhibit::Column::Slug.eq(slug))
            .filter(exhibit::Column::IsPublished.eq(true))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn filtered(filter: &ExhibitFilter) -> Select<Exhibit> {
        let mut query = Exhibit::find();

        if let Some(is_published) = filter.is_published {
            query = query.filter(exhibit::Column::IsPublished.eq(is_published));
        }
        if let Some(is_3d) = filter.is_3d {
            query = query.filter(exhibit::Column::Is3d.eq(is_3d));
        }
        if let Some(museum_id) = &filter.museum_id {
            query = query
                .join(JoinType::InnerJoin, exhibit::Relation::Block.def())
                .filter(museum_block::Column::MuseumId.eq(museum_id.as_str()));
        }
        if let Some(block_id) = &filter.block_id {
            query = query.filter(exhibit::Column::BlockId.eq(block_id.as_str()));
        }
        if let Some(section_id) = &filter.section_id {
            query = query.filter(exhibit::Column::SectionId.eq(section_id.as_str()));
        }
        if let Some(q) = non_blank(filter.search.as_deref()) {
            query = query.filter(search_condition(
                Exhibit,
                [
                    exhibit::Column::Slug,
                    exhibit::Column::TitleRu,
                    exhibit::Column::TitleUz,
                    exhibit::Column::TitleEn,
                    exhibit::Column::TitleAr,
                    exhibit::Column::DescriptionRu,
                    exhibit::Column::DescriptionUz,
                    exhibit::Column::DescriptionEn,
                ],
                q,
            ));
        }

        query
    }

    /// List exhibits ordered by slug.
    pub async fn list(
        &self,
        filter: &ExhibitFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<exhibit::Model>> {
        Self::filtered(filter)
            .order_by_asc(exhibit::Column::Slug)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count exhibits matching the filters.
    pub async fn count(&self, filter: &ExhibitFilter) -> AppResult<u64> {
        Self::filtered(filter)
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert an exhibit as the next member of its (block, section) group.
    ///
    /// Reads the group's highest `sequence_no` and inserts the row built by
    /// `build` in one transaction. `build` receives that maximum, `None` for
    /// an empty group. Concurrent inserts into the same group surface as
    /// [`AppError::Conflict`] through the unique indexes.
    pub async fn insert_in_group<F>(
        &self,
        block_id: &str,
        section_id: &str,
        build: F,
    ) -> AppResult<exhibit::Model>
    where
        F: FnOnce(Option<i32>) -> AppResult<exhibit::ActiveModel>,
    {
        #[derive(FromQueryResult)]
        struct MaxResult {
            last_sequence_no: Option<i32>,
        }

        let txn = self.db.begin().await.map_err(AppError::from)?;

        let last = Exhibit::find()
            .filter(exhibit::Column::BlockId.eq(block_id))
            .filter(exhibit::Column::SectionId.eq(section_id))
            .select_only()
            .column_as(exhibit::Column::SequenceNo.max(), "last_sequence_no")
            .into_model::<MaxResult>()
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .and_then(|r| r.last_sequence_no);

        let model = build(last)?.insert(&txn).await.map_err(AppError::from)?;
        txn.commit().await.map_err(AppError::from)?;

        Ok(model)
    }

    /// Update an exhibit.
    pub async fn update(&self, model: exhibit::ActiveModel) -> AppResult<exhibit::Model> {
        model.update(self.db.as_ref()).await.map_err(AppError::from)
    }

    /// Persist only the QR label key of an exhibit.
    pub async fn set_qr_code(&self, id: &str, qr_code: Option<String>) -> AppResult<()> {
        Exhibit::update_many()
            .col_expr(exhibit::Column::QrCode, Expr::value(qr_code))
            .filter(exhibit::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete an exhibit and its photo rows.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Exhibit::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from)?;
        Ok(())
    }
}
