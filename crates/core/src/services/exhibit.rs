//! Exhibit management and the visitor-facing exhibit views.

use std::sync::Arc;

use chrono::Utc;
use museum_common::config::CatalogConfig;
use museum_common::storage::keys;
use museum_common::{AppError, AppResult, IdGenerator, StorageService};
use museum_db::entities::exhibit::{self, DEFAULT_FRAMES_REQUIRED, MIN_FRAMES_REQUIRED};
use museum_db::entities::{museum, museum_block, museum_section};
use museum_db::repositories::{
    BlockRepository, ExhibitFilter, ExhibitPhotoRepository, ExhibitRepository, MuseumRepository,
    SectionRepository,
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use validator::Validate;

use super::identity::{ExhibitIdentity, retry_on_conflict};
use super::localization::{Language, LocalizedContent};
use super::pagination::{Page, offset};
use super::photo::{Ci360Manifest, FRAME_FILENAME_PATTERN, PhotoUpload, first_frame_url, frames_folder_url};
use super::qr::QrRenderer;

/// Multilingual exhibit texts. Absent fields are left untouched on update.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ExhibitText {
    #[validate(length(max = 255))]
    pub title_ru: Option<String>,
    #[validate(length(max = 255))]
    pub title_uz: Option<String>,
    #[validate(length(max = 255))]
    pub title_en: Option<String>,
    #[validate(length(max = 255))]
    pub title_ar: Option<String>,
    #[validate(length(max = 255))]
    pub sub_title_ru: Option<String>,
    #[validate(length(max = 255))]
    pub sub_title_uz: Option<String>,
    #[validate(length(max = 255))]
    pub sub_title_en: Option<String>,
    #[validate(length(max = 255))]
    pub sub_title_ar: Option<String>,
    pub description_ru: Option<String>,
    pub description_uz: Option<String>,
    pub description_en: Option<String>,
    pub description_ar: Option<String>,
}

impl ExhibitText {
    fn apply(self, model: &mut exhibit::ActiveModel, creating: bool) {
        let fields = [
            (self.title_ru, &mut model.title_ru),
            (self.title_uz, &mut model.title_uz),
            (self.title_en, &mut model.title_en),
            (self.title_ar, &mut model.title_ar),
            (self.sub_title_ru, &mut model.sub_title_ru),
            (self.sub_title_uz, &mut model.sub_title_uz),
            (self.sub_title_en, &mut model.sub_title_en),
            (self.sub_title_ar, &mut model.sub_title_ar),
            (self.description_ru, &mut model.description_ru),
            (self.description_uz, &mut model.description_uz),
            (self.description_en, &mut model.description_en),
            (self.description_ar, &mut model.description_ar),
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

/// Input for creating an exhibit. Block and section are fixed afterwards.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateExhibitInput {
    pub block_id: Option<String>,
    pub section_id: Option<String>,
    #[serde(flatten)]
    #[validate(nested)]
    pub text: ExhibitText,
    #[serde(default)]
    pub is_3d: bool,
    pub frames_required: Option<i32>,
    pub is_published: Option<bool>,
}

/// Input for updating an exhibit.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateExhibitInput {
    #[serde(flatten)]
    #[validate(nested)]
    pub text: ExhibitText,
    pub is_3d: Option<bool>,
    pub frames_required: Option<i32>,
    pub is_published: Option<bool>,
}

/// Visitor list filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicListQuery {
    pub museum_slug: Option<String>,
    pub q: Option<String>,
    pub block: Option<String>,
    pub section: Option<String>,
    pub page: Option<u64>,
}

/// An exhibit card in the visitor list.
#[derive(Debug, Clone, Serialize)]
pub struct ExhibitCard {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub audio_url: Option<String>,
    pub qr_url: Option<String>,
    pub is_3d: bool,
    pub single_url: String,
    pub frames_count: u64,
    pub folder: String,
    pub filename_pattern: String,
    pub first_frame_url: String,
}

/// Everything the exhibit page shows.
#[derive(Debug, Clone, Serialize)]
pub struct ExhibitDetail {
    pub id: String,
    pub slug: String,
    pub museum_slug: String,
    pub lang: Language,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub audio_url: Option<String>,
    pub qr_url: Option<String>,
    pub is_3d: bool,
    pub single_url: String,
    pub frames_count: u64,
    pub folder: String,
    pub filename_pattern: String,
    pub gallery: Vec<String>,
}

/// Where an exhibit sits in the catalog.
struct Placement {
    museum: museum::Model,
    block: museum_block::Model,
    section: museum_section::Model,
}

fn check_frames_required(frames_required: i32) -> AppResult<()> {
    if frames_required < MIN_FRAMES_REQUIRED {
        return Err(AppError::invalid_field(
            "frames_required",
            format!("Must be at least {MIN_FRAMES_REQUIRED}"),
        ));
    }
    Ok(())
}

impl Placement {
    /// Error for a code already held by an exhibit of another group.
    ///
    /// Such a clash repeats on every attempt, so it is reported instead of
    /// retried.
    fn foreign_holder(&self, slug: &str, holder: Option<&exhibit::Model>) -> Option<AppError> {
        holder
            .filter(|h| h.block_id != self.block.id || h.section_id != self.section.id)
            .map(|h| {
                AppError::invalid_field(
                    "section",
                    format!("Exhibit code {slug} is already used by exhibit {}", h.id),
                )
            })
    }
}

fn required_id<'a>(field: &'static str, value: Option<&'a str>) -> AppResult<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::invalid_field(field, "This field is required"))
}

/// Service for managing exhibits.
#[derive(Clone)]
pub struct ExhibitService {
    exhibit_repo: ExhibitRepository,
    museum_repo: MuseumRepository,
    block_repo: BlockRepository,
    section_repo: SectionRepository,
    photo_repo: ExhibitPhotoRepository,
    storage: StorageService,
    qr: Arc<dyn QrRenderer>,
    identity_retries: u32,
    page_size: u64,
    id_gen: IdGenerator,
}

impl ExhibitService {
    /// Create a new exhibit service.
    #[must_use]
    pub fn new(
        exhibit_repo: ExhibitRepository,
        museum_repo: MuseumRepository,
        block_repo: BlockRepository,
        section_repo: SectionRepository,
        photo_repo: ExhibitPhotoRepository,
        storage: StorageService,
        qr: Arc<dyn QrRenderer>,
        catalog: &CatalogConfig,
    ) -> Self {
        Self {
            exhibit_repo,
            museum_repo,
            block_repo,
            section_repo,
            photo_repo,
            storage,
            qr,
            identity_retries: catalog.identity_retries,
            page_size: catalog.page_size.max(1),
            id_gen: IdGenerator::new(),
        }
    }

    // ==================== Admin ====================

    /// List exhibits ordered by code.
    pub async fn list(
        &self,
        filter: &ExhibitFilter,
        page: u64,
        per_page: u64,
    ) -> AppResult<Page<exhibit::Model>> {
        let items = self
            .exhibit_repo
            .list(filter, per_page, offset(page, per_page))
            .await?;
        let total = self.exhibit_repo.count(filter).await?;
        Ok(Page::new(items, page.max(1), per_page, total))
    }

    /// Get an exhibit by ID.
    pub async fn get(&self, id: &str) -> AppResult<exhibit::Model> {
        self.exhibit_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ExhibitNotFound(id.to_string()))
    }

    async fn resolve_placement(
        &self,
        block_id: Option<&str>,
        section_id: Option<&str>,
    ) -> AppResult<Placement> {
        let block_id = required_id("block", block_id)?;
        let section_id = required_id("section", section_id)?;

        let block = self
            .block_repo
            .find_by_id(block_id)
            .await?
            .ok_or_else(|| AppError::invalid_field("block", "Unknown block"))?;
        let section = self
            .section_repo
            .find_by_id(section_id)
            .await?
            .ok_or_else(|| AppError::invalid_field("section", "Unknown section"))?;

        if section.block_id.as_deref() != Some(block.id.as_str()) {
            return Err(AppError::invalid_field(
                "section",
                "The section does not belong to the selected block",
            ));
        }

        let museum = self
            .museum_repo
            .find_by_id(&block.museum_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Museum not found: {}", block.museum_id)))?;

        Ok(Placement {
            museum,
            block,
            section,
        })
    }

    async fn museum_slug_of(&self, exhibit: &exhibit::Model) -> AppResult<String> {
        let block = self
            .block_repo
            .find_by_id(&exhibit.block_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Block not found: {}", exhibit.block_id)))?;
        let museum = self
            .museum_repo
            .find_by_id(&block.museum_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Museum not found: {}", block.museum_id)))?;
        Ok(museum.slug)
    }

    fn new_model(
        &self,
        identity: ExhibitIdentity,
        placement: &Placement,
        input: &CreateExhibitInput,
        frames_required: i32,
    ) -> exhibit::ActiveModel {
        let now = Utc::now();
        let mut model = exhibit::ActiveModel {
            id: Set(self.id_gen.generate()),
            block_id: Set(placement.block.id.clone()),
            section_id: Set(placement.section.id.clone()),
            slug: Set(identity.slug),
            sequence_no: Set(identity.sequence_no),
            qr_code: Set(None),
            audio_ru: Set(None),
            audio_uz: Set(None),
            audio_en: Set(None),
            single_image: Set(None),
            is_3d: Set(input.is_3d),
            frames_required: Set(frames_required),
            is_published: Set(input.is_published.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        input.text.clone().apply(&mut model, true);
        model
    }

    /// Create an exhibit, assign its code and render its QR label.
    ///
    /// Identity assignment is retried when a concurrent insert took the
    /// same number. A failed QR render leaves the label empty; the next
    /// save tries again.
    pub async fn create(&self, input: CreateExhibitInput) -> AppResult<exhibit::Model> {
        input.validate()?;
        let frames_required = input.frames_required.unwrap_or(DEFAULT_FRAMES_REQUIRED);
        check_frames_required(frames_required)?;
        if input.text.title_ru.as_deref().is_none_or(|t| t.trim().is_empty()) {
            return Err(AppError::invalid_field("title_ru", "This field is required"));
        }

        let placement = self
            .resolve_placement(input.block_id.as_deref(), input.section_id.as_deref())
            .await?;

        let this = self;
        let input = &input;
        let placement = &placement;
        let exhibit = retry_on_conflict(self.identity_retries, move |attempt| async move {
            let mut candidate = None;
            let result = this
                .exhibit_repo
                .insert_in_group(&placement.block.id, &placement.section.id, |last| {
                    let identity = ExhibitIdentity::assign_once(
                        None,
                        &placement.museum.slug,
                        &placement.block.slug,
                        placement.section.code_num,
                        last,
                    );
                    debug!(attempt, slug = %identity.slug, "Assigning exhibit identity");
                    candidate = Some(identity.slug.clone());
                    Ok(this.new_model(identity, placement, input, frames_required))
                })
                .await;

            match (result, candidate) {
                (Err(AppError::Conflict(detail)), Some(slug)) => {
                    let holder = this.exhibit_repo.find_by_slug(&slug).await?;
                    Err(placement
                        .foreign_holder(&slug, holder.as_ref())
                        .unwrap_or(AppError::Conflict(detail)))
                }
                (result, _) => result,
            }
        })
        .await?;

        info!(exhibit_id = %exhibit.id, slug = %exhibit.slug, "Exhibit created");

        self.ensure_qr(exhibit, &placement.museum.slug).await
    }

    /// Update texts and flags. The exhibit code never changes.
    pub async fn update(&self, id: &str, input: UpdateExhibitInput) -> AppResult<exhibit::Model> {
        input.validate()?;
        if let Some(frames_required) = input.frames_required {
            check_frames_required(frames_required)?;
        }
        if input.text.title_ru.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(AppError::invalid_field("title_ru", "This field is required"));
        }

        let current = self.get(id).await?;
        let mut model: exhibit::ActiveModel = current.into();
        input.text.apply(&mut model, false);
        if let Some(is_3d) = input.is_3d {
            model.is_3d = Set(is_3d);
        }
        if let Some(frames_required) = input.frames_required {
            model.frames_required = Set(frames_required);
        }
        if let Some(is_published) = input.is_published {
            model.is_published = Set(is_published);
        }
        model.updated_at = Set(Utc::now());

        let exhibit = self.exhibit_repo.update(model).await?;
        if exhibit.qr_code.is_some() {
            return Ok(exhibit);
        }
        let museum_slug = self.museum_slug_of(&exhibit).await?;
        self.ensure_qr(exhibit, &museum_slug).await
    }

    async fn store_qr(&self, exhibit: &exhibit::Model, museum_slug: &str) -> AppResult<String> {
        let png = self.qr.render(museum_slug, &exhibit.slug)?;
        let key = keys::qr_code(&exhibit.slug);
        self.storage.upload(&key, &png, "image/png").await?;
        Ok(key)
    }

    /// Render the QR label if the exhibit has none yet.
    async fn ensure_qr(
        &self,
        mut exhibit: exhibit::Model,
        museum_slug: &str,
    ) -> AppResult<exhibit::Model> {
        if exhibit.qr_code.is_some() {
            return Ok(exhibit);
        }
        match self.store_qr(&exhibit, museum_slug).await {
            Ok(key) => {
                self.exhibit_repo
                    .set_qr_code(&exhibit.id, Some(key.clone()))
                    .await?;
                exhibit.qr_code = Some(key);
            }
            Err(e) => {
                warn!(slug = %exhibit.slug, error = %e, "QR label generation failed");
            }
        }
        Ok(exhibit)
    }

    /// Re-render the QR labels of the given exhibits. Returns how many were updated.
    pub async fn regenerate_qr(&self, ids: &[String]) -> AppResult<u64> {
        let mut count = 0;
        for exhibit in self.exhibit_repo.find_by_ids(ids).await? {
            if let Some(old) = &exhibit.qr_code {
                self.storage.delete(old).await?;
            }
            let museum_slug = self.museum_slug_of(&exhibit).await?;
            let key = self.store_qr(&exhibit, &museum_slug).await?;
            self.exhibit_repo.set_qr_code(&exhibit.id, Some(key)).await?;
            count += 1;
        }
        info!(count, "QR labels regenerated");
        Ok(count)
    }

    /// Replace the flat display photo.
    pub async fn set_single_image(
        &self,
        id: &str,
        upload: PhotoUpload,
    ) -> AppResult<exhibit::Model> {
        let exhibit = self.get(id).await?;
        let key = keys::single_image(&exhibit.slug, &upload.file_name);

        if let Some(old) = exhibit.single_image.as_deref().filter(|old| *old != key) {
            self.storage.delete(old).await?;
        }
        self.storage
            .upload(&key, &upload.data, &upload.content_type)
            .await?;

        let mut model: exhibit::ActiveModel = exhibit.into();
        model.single_image = Set(Some(key));
        model.updated_at = Set(Utc::now());
        self.exhibit_repo.update(model).await
    }

    /// Replace the narration track of one language. Arabic has no track.
    pub async fn set_audio(
        &self,
        id: &str,
        lang: Language,
        upload: PhotoUpload,
    ) -> AppResult<exhibit::Model> {
        if lang == Language::Ar {
            return Err(AppError::invalid_field(
                "lang",
                "Audio is available in ru, uz and en only",
            ));
        }

        let exhibit = self.get(id).await?;
        let key = keys::audio(
            &exhibit.slug,
            lang.code(),
            &self.id_gen.generate_file_stem(),
            &upload.file_name,
        );
        self.storage
            .upload(&key, &upload.data, &upload.content_type)
            .await?;

        let old = match lang {
            Language::Ru => exhibit.audio_ru.clone(),
            Language::Uz => exhibit.audio_uz.clone(),
            Language::En | Language::Ar => exhibit.audio_en.clone(),
        };

        let mut model: exhibit::ActiveModel = exhibit.into();
        match lang {
            Language::Ru => model.audio_ru = Set(Some(key)),
            Language::Uz => model.audio_uz = Set(Some(key)),
            Language::En | Language::Ar => model.audio_en = Set(Some(key)),
        }
        model.updated_at = Set(Utc::now());
        let exhibit = self.exhibit_repo.update(model).await?;

        if let Some(old) = old {
            self.storage.delete(&old).await?;
        }
        Ok(exhibit)
    }

    /// Delete an exhibit, its photos and every stored file.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let exhibit = self.get(id).await?;
        let photos = self.photo_repo.find_by_exhibit(id).await?;

        self.exhibit_repo.delete(id).await?;

        let files = photos
            .into_iter()
            .map(|p| p.image)
            .chain(exhibit.qr_code)
            .chain(exhibit.single_image)
            .chain(exhibit.audio_ru)
            .chain(exhibit.audio_uz)
            .chain(exhibit.audio_en);
        for key in files {
            if let Err(e) = self.storage.delete(&key).await {
                warn!(key = %key, error = %e, "Failed to remove exhibit file");
            }
        }

        info!(exhibit_id = %id, slug = %exhibit.slug, "Exhibit deleted");
        Ok(())
    }

    // ==================== Public ====================

    fn url(&self, key: Option<&str>) -> Option<String> {
        key.filter(|k| !k.is_empty())
            .map(|k| self.storage.public_url(k))
    }

    /// Published exhibits for visitors, localized, one page at a time.
    pub async fn public_list(
        &self,
        query: &PublicListQuery,
        lang: Language,
    ) -> AppResult<Page<ExhibitCard>> {
        let museum_id = match query.museum_slug.as_deref() {
            Some(slug) => Some(
                self.museum_repo
                    .find_by_slug(slug)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Museum not found: {slug}")))?
                    .id,
            ),
            None => None,
        };

        let filter = ExhibitFilter {
            museum_id,
            block_id: query.block.clone().filter(|b| !b.is_empty()),
            section_id: query.section.clone().filter(|s| !s.is_empty()),
            search: query.q.clone(),
            ..ExhibitFilter::published()
        };

        let page = query.page.unwrap_or(1).max(1);
        let exhibits = self
            .exhibit_repo
            .list(&filter, self.page_size, offset(page, self.page_size))
            .await?;
        let total = self.exhibit_repo.count(&filter).await?;

        let ids: Vec<String> = exhibits.iter().map(|e| e.id.clone()).collect();
        let frame_counts = self.photo_repo.count_active_frames_by_exhibits(&ids).await?;
        let first_gallery = self.photo_repo.first_gallery_by_exhibits(&ids).await?;

        let cards = exhibits
            .into_iter()
            .map(|e| {
                let content = LocalizedContent::resolve(&e, lang);
                ExhibitCard {
                    first_frame_url: first_frame_url(&self.storage, &e, first_gallery.get(&e.id)),
                    frames_count: frame_counts.get(&e.id).copied().unwrap_or(0),
                    folder: frames_folder_url(&self.storage, &e.slug),
                    filename_pattern: FRAME_FILENAME_PATTERN.to_string(),
                    title: content.title,
                    subtitle: content.subtitle,
                    description: content.description,
                    audio_url: self.url(content.audio.as_deref()),
                    qr_url: self.url(e.qr_code.as_deref()),
                    single_url: self.url(e.single_image.as_deref()).unwrap_or_default(),
                    is_3d: e.is_3d,
                    id: e.id,
                    slug: e.slug,
                }
            })
            .collect();

        Ok(Page::new(cards, page, self.page_size, total))
    }

    /// Exhibit page reached through a QR link. Unpublished exhibits and
    /// exhibits of another museum are not found.
    pub async fn public_detail(
        &self,
        museum_slug: &str,
        exhibit_slug: &str,
        lang: Language,
    ) -> AppResult<ExhibitDetail> {
        let exhibit = self
            .exhibit_repo
            .find_published_by_slug(exhibit_slug)
            .await?
            .ok_or_else(|| AppError::ExhibitNotFound(exhibit_slug.to_string()))?;

        let actual_museum = self.museum_slug_of(&exhibit).await?;
        if actual_museum != museum_slug {
            debug!(slug = %exhibit.slug, requested = %museum_slug, "Exhibit not in this museum");
            return Err(AppError::ExhibitNotFound(exhibit_slug.to_string()));
        }

        let frames_count = self.photo_repo.count_active_frames(&exhibit.id).await?;
        let gallery = self
            .photo_repo
            .active_gallery(&exhibit.id)
            .await?
            .into_iter()
            .map(|p| self.storage.public_url(&p.image))
            .collect();

        let content = LocalizedContent::resolve(&exhibit, lang);
        Ok(ExhibitDetail {
            museum_slug: actual_museum,
            lang,
            title: content.title,
            subtitle: content.subtitle,
            description: content.description,
            audio_url: self.url(content.audio.as_deref()),
            qr_url: self.url(exhibit.qr_code.as_deref()),
            is_3d: exhibit.is_3d,
            single_url: self.url(exhibit.single_image.as_deref()).unwrap_or_default(),
            frames_count,
            folder: frames_folder_url(&self.storage, &exhibit.slug),
            filename_pattern: FRAME_FILENAME_PATTERN.to_string(),
            gallery,
            id: exhibit.id,
            slug: exhibit.slug,
        })
    }

    /// 360-degree viewer manifest of a published exhibit.
    pub async fn manifest(&self, slug: &str) -> AppResult<Ci360Manifest> {
        let exhibit = self
            .exhibit_repo
            .find_published_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::ExhibitNotFound(slug.to_string()))?;
        let frames = self.photo_repo.count_active_frames(&exhibit.id).await?;
        Ok(Ci360Manifest::new(&self.storage, &exhibit.slug, frames))
    }
}
