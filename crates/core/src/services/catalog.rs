//! Museums, blocks and sections.

use museum_common::slug::validate_code;
use museum_common::{AppError, AppResult, IdGenerator};
use museum_db::entities::{museum, museum_block, museum_section};
use museum_db::repositories::{
    BlockRepository, ExhibitFilter, ExhibitRepository, MuseumRepository, SectionFilter,
    SectionRepository,
};
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::pagination::{Page, offset};

/// Results returned by the section picker.
const AUTOCOMPLETE_LIMIT: u64 = 20;

/// Titles and descriptions shared by museums, blocks and sections.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CatalogText {
    #[validate(length(max = 255))]
    pub title_ru: Option<String>,
    #[validate(length(max = 255))]
    pub title_uz: Option<String>,
    #[validate(length(max = 255))]
    pub title_en: Option<String>,
    pub description_ru: Option<String>,
    pub description_uz: Option<String>,
    pub description_en: Option<String>,
}

/// Text columns of a catalog row, as set on an active model.
struct TextColumns<'a> {
    title_ru: &'a mut ActiveValue<String>,
    title_uz: &'a mut ActiveValue<String>,
    title_en: &'a mut ActiveValue<String>,
    description_ru: &'a mut ActiveValue<String>,
    description_uz: &'a mut ActiveValue<String>,
    description_en: &'a mut ActiveValue<String>,
}

impl CatalogText {
    fn check(&self, creating: bool) -> AppResult<()> {
        self.validate()?;
        let title_ru = self.title_ru.as_deref().map(str::trim);
        if title_ru == Some("") || (creating && title_ru.is_none()) {
            return Err(AppError::invalid_field("title_ru", "This field is required"));
        }
        Ok(())
    }

    /// Set provided fields; on create, absent optional fields become empty.
    fn apply(self, columns: TextColumns<'_>, creating: bool) {
        let fields = [
            (self.title_ru, columns.title_ru),
            (self.title_uz, columns.title_uz),
            (self.title_en, columns.title_en),
            (self.description_ru, columns.description_ru),
            (self.description_uz, columns.description_uz),
            (self.description_en, columns.description_en),
        ];
        for (value, column) in fields {
            match value {
                Some(v) => *column = Set(v),
                None if creating => *column = Set(String::new()),
                None => {}
            }
        }
    }
}

macro_rules! text_columns {
    ($model:expr) => {
        TextColumns {
            title_ru: &mut $model.title_ru,
            title_uz: &mut $model.title_uz,
            title_en: &mut $model.title_en,
            description_ru: &mut $model.description_ru,
            description_uz: &mut $model.description_uz,
            description_en: &mut $model.description_en,
        }
    };
}

/// Input for creating a museum.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMuseumInput {
    pub slug: String,
    #[serde(flatten)]
    pub text: CatalogText,
}

/// Input for creating a block.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBlockInput {
    pub museum_id: String,
    pub slug: String,
    #[serde(flatten)]
    pub text: CatalogText,
}

/// Input for creating a section.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSectionInput {
    pub museum_id: String,
    pub block_id: String,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub code_num: i32,
    #[serde(flatten)]
    #[validate(nested)]
    pub text: CatalogText,
}

/// Input for updating a section.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSectionInput {
    #[validate(range(min = 0))]
    pub code_num: Option<i32>,
    #[serde(flatten)]
    #[validate(nested)]
    pub text: CatalogText,
}

/// A section as offered to pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionOption {
    pub id: String,
    pub code_num: i32,
    pub title: String,
}

impl From<museum_section::Model> for SectionOption {
    fn from(section: museum_section::Model) -> Self {
        Self {
            title: format!("{} - {}", section.code_num, section.title_ru),
            id: section.id,
            code_num: section.code_num,
        }
    }
}

/// Service for managing museums.
#[derive(Clone)]
pub struct MuseumService {
    museum_repo: MuseumRepository,
    id_gen: IdGenerator,
}

impl MuseumService {
    /// Create a new museum service.
    #[must_use]
    pub const fn new(museum_repo: MuseumRepository) -> Self {
        Self {
            museum_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List museums ordered by code.
    pub async fn list(
        &self,
        search: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> AppResult<Page<museum::Model>> {
        let items = self
            .museum_repo
            .list(search, per_page, offset(page, per_page))
            .await?;
        let total = self.museum_repo.count(search).await?;
        Ok(Page::new(items, page.max(1), per_page, total))
    }

    /// Get a museum by ID.
    pub async fn get(&self, id: &str) -> AppResult<museum::Model> {
        self.museum_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Museum not found: {id}")))
    }

    /// Get a museum by its code.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<museum::Model> {
        self.museum_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Museum not found: {slug}")))
    }

    /// Create a museum.
    pub async fn create(&self, input: CreateMuseumInput) -> AppResult<museum::Model> {
        validate_code("slug", &input.slug)?;
        input.text.check(true)?;

        if self.museum_repo.find_by_slug(&input.slug).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Museum code already in use: {}",
                input.slug
            )));
        }

        let mut model = museum::ActiveModel {
            id: Set(self.id_gen.generate()),
            slug: Set(input.slug),
            ..Default::default()
        };
        input.text.apply(text_columns!(model), true);

        let museum = self.museum_repo.create(model).await?;
        info!(museum = %museum.slug, "Museum created");
        Ok(museum)
    }

    /// Update a museum's texts. The code is fixed once exhibits link to it.
    pub async fn update(&self, id: &str, text: CatalogText) -> AppResult<museum::Model> {
        text.check(false)?;
        let mut model: museum::ActiveModel = self.get(id).await?.into();
        text.apply(text_columns!(model), false);
        self.museum_repo.update(model).await
    }

    /// Delete a museum with its blocks and sections.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let museum = self.get(id).await?;
        self.museum_repo.delete(id).await?;
        info!(museum = %museum.slug, "Museum deleted");
        Ok(())
    }
}

/// Service for managing museum blocks.
#[derive(Clone)]
pub struct BlockService {
    block_repo: BlockRepository,
    museum_repo: MuseumRepository,
    id_gen: IdGenerator,
}

impl BlockService {
    /// Create a new block service.
    #[must_use]
    pub const fn new(block_repo: BlockRepository, museum_repo: MuseumRepository) -> Self {
        Self {
            block_repo,
            museum_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List blocks, optionally of one museum.
    pub async fn list(
        &self,
        museum_id: Option<&str>,
        search: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> AppResult<Page<museum_block::Model>> {
        let items = self
            .block_repo
            .list(museum_id, search, per_page, offset(page, per_page))
            .await?;
        let total = self.block_repo.count(museum_id, search).await?;
        Ok(Page::new(items, page.max(1), per_page, total))
    }

    /// Get a block by ID.
    pub async fn get(&self, id: &str) -> AppResult<museum_block::Model> {
        self.block_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Block not found: {id}")))
    }

    /// Create a block. Codes are unique within a museum.
    pub async fn create(&self, input: CreateBlockInput) -> AppResult<museum_block::Model> {
        validate_code("slug", &input.slug)?;
        input.text.check(true)?;

        let museum = self
            .museum_repo
            .find_by_id(&input.museum_id)
            .await?
            .ok_or_else(|| AppError::invalid_field("museum_id", "Unknown museum"))?;

        if self
            .block_repo
            .find_by_museum_and_slug(&museum.id, &input.slug)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Block code {} already exists in museum {}",
                input.slug, museum.slug
            )));
        }

        let mut model = museum_block::ActiveModel {
            id: Set(self.id_gen.generate()),
            museum_id: Set(museum.id),
            slug: Set(input.slug),
            ..Default::default()
        };
        input.text.apply(text_columns!(model), true);

        let block = self.block_repo.create(model).await?;
        info!(museum = %museum.slug, block = %block.slug, "Block created");
        Ok(block)
    }

    /// Update a block's texts.
    pub async fn update(&self, id: &str, text: CatalogText) -> AppResult<museum_block::Model> {
        text.check(false)?;
        let mut model: museum_block::ActiveModel = self.get(id).await?.into();
        text.apply(text_columns!(model), false);
        self.block_repo.update(model).await
    }

    /// Delete a block with its sections. Blocks holding exhibits are kept.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.get(id).await?;
        self.block_repo.delete(id).await
    }
}

/// Service for managing museum sections.
#[derive(Clone)]
pub struct SectionService {
    section_repo: SectionRepository,
    block_repo: BlockRepository,
    exhibit_repo: ExhibitRepository,
    id_gen: IdGenerator,
}

impl SectionService {
    /// Create a new section service.
    #[must_use]
    pub const fn new(
        section_repo: SectionRepository,
        block_repo: BlockRepository,
        exhibit_repo: ExhibitRepository,
    ) -> Self {
        Self {
            section_repo,
            block_repo,
            exhibit_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List sections ordered by block and number.
    pub async fn list(
        &self,
        filter: &SectionFilter,
        page: u64,
        per_page: u64,
    ) -> AppResult<Page<museum_section::Model>> {
        let items = self
            .section_repo
            .list(filter, per_page, offset(page, per_page))
            .await?;
        let total = self.section_repo.count(filter).await?;
        Ok(Page::new(items, page.max(1), per_page, total))
    }

    /// Get a section by ID.
    pub async fn get(&self, id: &str) -> AppResult<museum_section::Model> {
        self.section_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Section not found: {id}")))
    }

    /// Create a section inside a block of the given museum.
    pub async fn create(&self, input: CreateSectionInput) -> AppResult<museum_section::Model> {
        input.validate()?;
        input.text.check(true)?;

        let block = self
            .block_repo
            .find_by_id(&input.block_id)
            .await?
            .ok_or_else(|| AppError::invalid_field("block_id", "Unknown block"))?;
        if block.museum_id != input.museum_id {
            return Err(AppError::invalid_field(
                "block_id",
                "The block belongs to another museum",
            ));
        }

        let mut model = museum_section::ActiveModel {
            id: Set(self.id_gen.generate()),
            museum_id: Set(block.museum_id),
            block_id: Set(Some(block.id)),
            code_num: Set(input.code_num),
            ..Default::default()
        };
        input.text.apply(text_columns!(model), true);

        self.section_repo.create(model).await
    }

    /// Update a section's number and texts.
    ///
    /// The number is part of every exhibit code in the section, so it is
    /// fixed once the section holds exhibits.
    pub async fn update(
        &self,
        id: &str,
        input: UpdateSectionInput,
    ) -> AppResult<museum_section::Model> {
        input.validate()?;
        input.text.check(false)?;

        let section = self.get(id).await?;
        let renumbered = input.code_num.filter(|&n| n != section.code_num);
        if renumbered.is_some() {
            let exhibits = self
                .exhibit_repo
                .count(&ExhibitFilter {
                    section_id: Some(section.id.clone()),
                    ..Default::default()
                })
                .await?;
            if exhibits > 0 {
                return Err(AppError::invalid_field(
                    "code_num",
                    "The number of a section with exhibits cannot change",
                ));
            }
        }

        let mut model: museum_section::ActiveModel = section.into();
        if let Some(code_num) = renumbered {
            model.code_num = Set(code_num);
        }
        input.text.apply(text_columns!(model), false);

        self.section_repo.update(model).await
    }

    /// Delete a section. Sections holding exhibits are kept.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.get(id).await?;
        self.section_repo.delete(id).await
    }

    /// Sections of a block for cascading pickers.
    pub async fn sections_by_block(&self, block_id: &str) -> AppResult<Vec<SectionOption>> {
        Ok(self
            .section_repo
            .find_by_block(block_id)
            .await?
            .into_iter()
            .map(SectionOption::from)
            .collect())
    }

    /// Section picker search, limited to a block when one is chosen.
    pub async fn autocomplete(
        &self,
        block_id: Option<&str>,
        query: Option<&str>,
    ) -> AppResult<Vec<SectionOption>> {
        Ok(self
            .section_repo
            .autocomplete(block_id, query, AUTOCOMPLETE_LIMIT)
            .await?
            .into_iter()
            .map(SectionOption::from)
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use museum_db::test_utils::fixtures;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::sync::Arc;

    fn section_service(db: Arc<sea_orm::DatabaseConnection>) -> SectionService {
        SectionService::new(
            SectionRepository::new(db.clone()),
            BlockRepository::new(db.clone()),
            ExhibitRepository::new(db),
        )
    }

    fn text(title_ru: &str) -> CatalogText {
        CatalogText {
            title_ru: Some(title_ru.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_museum() {
        let museum = fixtures::museum("m1", "ISC");
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<museum::Model>::new()])
                .append_query_results([[museum]])
                .into_connection(),
        );

        let service = MuseumService::new(MuseumRepository::new(db));
        let result = service
            .create(CreateMuseumInput {
                slug: "ISC".to_string(),
                text: text("Музей ISC"),
            })
            .await
            .unwrap();

        assert_eq!(result.slug, "ISC");
    }

    #[tokio::test]
    async fn test_create_museum_rejects_bad_code() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = MuseumService::new(MuseumRepository::new(db));

        let result = service
            .create(CreateMuseumInput {
                slug: "IS C".to_string(),
                text: text("Музей"),
            })
            .await;

        assert!(matches!(
            result,
            Err(AppError::InvalidField { field: "slug", .. })
        ));
    }

    #[tokio::test]
    async fn test_create_museum_requires_russian_title() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = MuseumService::new(MuseumRepository::new(db));

        let result = service
            .create(CreateMuseumInput {
                slug: "ISC".to_string(),
                text: CatalogText::default(),
            })
            .await;

        assert!(matches!(
            result,
            Err(AppError::InvalidField {
                field: "title_ru",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_create_block_duplicate_code() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::museum("m1", "ISC")]])
                .append_query_results([[fixtures::block("b1", "m1", "REN2")]])
                .into_connection(),
        );

        let service = BlockService::new(
            BlockRepository::new(db.clone()),
            MuseumRepository::new(db),
        );
        let result = service
            .create(CreateBlockInput {
                museum_id: "m1".to_string(),
                slug: "REN2".to_string(),
                text: text("Ренессанс"),
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_section_block_of_other_museum() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::block("b1", "m2", "REN2")]])
                .into_connection(),
        );

        let service = section_service(db);
        let result = service
            .create(CreateSectionInput {
                museum_id: "m1".to_string(),
                block_id: "b1".to_string(),
                code_num: 1,
                text: text("Экспозиция"),
            })
            .await;

        assert!(matches!(
            result,
            Err(AppError::InvalidField {
                field: "block_id",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_create_section_negative_number() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = section_service(db);

        let result = service
            .create(CreateSectionInput {
                museum_id: "m1".to_string(),
                block_id: "b1".to_string(),
                code_num: -1,
                text: text("Экспозиция"),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_sections_by_block() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    fixtures::section("s1", "m1", "b1", 1),
                    fixtures::section("s2", "m1", "b1", 2),
                ]])
                .into_connection(),
        );

        let service = section_service(db);
        let options = service.sections_by_block("b1").await.unwrap();

        assert_eq!(options.len(), 2);
        assert_eq!(options[0].title, "1 - Экспозиция 1");
    }

    #[tokio::test]
    async fn test_update_section_number_locked_by_exhibits() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::section("s1", "m1", "b1", 1)]])
                .append_query_results([[btreemap! {
                    "num_items" => Value::BigInt(Some(3)),
                }]])
                .into_connection(),
        );

        let result = section_service(db)
            .update(
                "s1",
                UpdateSectionInput {
                    code_num: Some(2),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(AppError::InvalidField {
                field: "code_num",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_update_empty_section_number() {
        let mut renumbered = fixtures::section("s1", "m1", "b1", 1);
        renumbered.code_num = 2;
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::section("s1", "m1", "b1", 1)]])
                .append_query_results([[btreemap! {
                    "num_items" => Value::BigInt(Some(0)),
                }]])
                .append_query_results([[renumbered]])
                .into_connection(),
        );

        let section = section_service(db)
            .update(
                "s1",
                UpdateSectionInput {
                    code_num: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(section.code_num, 2);
    }

    #[test]
    fn test_apply_keeps_absent_fields_on_update() {
        let mut model: museum::ActiveModel = fixtures::museum("m1", "ISC").into();
        CatalogText {
            title_en: Some("Renamed".to_string()),
            ..Default::default()
        }
        .apply(text_columns!(model), false);

        assert_eq!(model.title_en, Set("Renamed".to_string()));
        assert!(!model.title_ru.is_set());
    }
}
