//! Exhibit administration: CRUD, QR labels, media uploads and photos.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use museum_common::{AppError, AppResult};
use museum_core::{
    CreateExhibitInput, CreatePhotoInput, Language, Page, PhotoView, UpdateExhibitInput,
};
use museum_db::entities::exhibit_photo::PhotoKind;
use museum_db::entities::{exhibit, exhibit_photo};
use museum_db::repositories::ExhibitFilter;
use serde::{Deserialize, Serialize};

use super::page_bounds;
use crate::{
    extractors::UploadForm,
    middleware::AppState,
    response::{self, ApiResponse},
};

/// Largest accepted media upload.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct ListExhibitsQuery {
    pub is_published: Option<bool>,
    pub is_3d: Option<bool>,
    pub museum: Option<String>,
    pub block: Option<String>,
    pub section: Option<String>,
    pub q: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

async fn list_exhibits(
    State(state): State<AppState>,
    Query(query): Query<ListExhibitsQuery>,
) -> AppResult<ApiResponse<Page<exhibit::Model>>> {
    let (page, per_page) = page_bounds(query.page, query.per_page, state.page_size);
    let filter = ExhibitFilter {
        is_published: query.is_published,
        is_3d: query.is_3d,
        museum_id: query.museum,
        block_id: query.block,
        section_id: query.section,
        search: query.q,
    };
    let exhibits = state.exhibit_service.list(&filter, page, per_page).await?;
    Ok(ApiResponse::ok(exhibits))
}

async fn create_exhibit(
    State(state): State<AppState>,
    Json(input): Json<CreateExhibitInput>,
) -> AppResult<ApiResponse<exhibit::Model>> {
    Ok(ApiResponse::created(state.exhibit_service.create(input).await?))
}

async fn get_exhibit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<exhibit::Model>> {
    Ok(ApiResponse::ok(state.exhibit_service.get(&id).await?))
}

async fn update_exhibit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateExhibitInput>,
) -> AppResult<ApiResponse<exhibit::Model>> {
    Ok(ApiResponse::ok(state.exhibit_service.update(&id, input).await?))
}

async fn delete_exhibit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.exhibit_service.delete(&id).await?;
    Ok(response::ok())
}

#[derive(Debug, Deserialize)]
pub struct RegenerateQrRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RegenerateQrResponse {
    pub updated: u64,
}

/// Re-render the QR labels of the selected exhibits.
async fn regenerate_qr(
    State(state): State<AppState>,
    Json(req): Json<RegenerateQrRequest>,
) -> AppResult<ApiResponse<RegenerateQrResponse>> {
    if req.ids.is_empty() {
        return Err(AppError::invalid_field("ids", "Select at least one exhibit"));
    }
    let updated = state.exhibit_service.regenerate_qr(&req.ids).await?;
    Ok(ApiResponse::ok(RegenerateQrResponse { updated }))
}

async fn upload_single_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<ApiResponse<exhibit::Model>> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.take_file()?;
    let exhibit = state.exhibit_service.set_single_image(&id, upload).await?;
    Ok(ApiResponse::ok(exhibit))
}

async fn upload_audio(
    State(state): State<AppState>,
    Path((id, lang)): Path<(String, String)>,
    multipart: Multipart,
) -> AppResult<ApiResponse<exhibit::Model>> {
    let lang = Language::parse(&lang)
        .ok_or_else(|| AppError::invalid_field("lang", format!("Unknown language: {lang}")))?;
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.take_file()?;
    let exhibit = state.exhibit_service.set_audio(&id, lang, upload).await?;
    Ok(ApiResponse::ok(exhibit))
}

#[derive(Debug, Default, Deserialize)]
pub struct PhotoListQuery {
    #[serde(default)]
    pub view: PhotoView,
}

async fn list_photos(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PhotoListQuery>,
) -> AppResult<ApiResponse<Vec<exhibit_photo::Model>>> {
    Ok(ApiResponse::ok(
        state.photo_service.list(&id, query.view).await?,
    ))
}

fn photo_input(form: &UploadForm) -> AppResult<CreatePhotoInput> {
    let kind = match form.text("kind") {
        None | Some("frame") => PhotoKind::Frame,
        Some("gallery") => PhotoKind::Gallery,
        Some(other) => {
            return Err(AppError::invalid_field(
                "kind",
                format!("Unknown photo kind: {other}"),
            ));
        }
    };
    let frame_index = form
        .text("frame_index")
        .map(|v| {
            v.parse::<i32>()
                .map_err(|_| AppError::invalid_field("frame_index", "Must be a whole number"))
        })
        .transpose()?;

    Ok(CreatePhotoInput {
        kind,
        frame_index,
        is_active: form.flag("is_active").unwrap_or(true),
    })
}

/// Add a frame or gallery photo from a multipart form.
async fn upload_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<ApiResponse<exhibit_photo::Model>> {
    let mut form = UploadForm::read(multipart).await?;
    let input = photo_input(&form)?;
    let upload = form.take_file()?;
    let photo = state.photo_service.create(&id, input, upload).await?;
    Ok(ApiResponse::created(photo))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_exhibits).post(create_exhibit))
        .route("/regenerate-qr", post(regenerate_qr))
        .route(
            "/{id}",
            get(get_exhibit).patch(update_exhibit).delete(delete_exhibit),
        )
        .route(
            "/{id}/single-image",
            post(upload_single_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/{id}/audio/{lang}",
            post(upload_audio).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/{id}/photos",
            get(list_photos)
                .post(upload_photo)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(fields: &[(&str, &str)]) -> UploadForm {
        UploadForm {
            file: None,
            fields: fields
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_photo_input_defaults_to_active_frame() {
        let input = photo_input(&form(&[("frame_index", "12")])).unwrap();
        assert_eq!(input.kind, PhotoKind::Frame);
        assert_eq!(input.frame_index, Some(12));
        assert!(input.is_active);
    }

    #[test]
    fn test_photo_input_gallery_inactive() {
        let input = photo_input(&form(&[("kind", "gallery"), ("is_active", "false")])).unwrap();
        assert_eq!(input.kind, PhotoKind::Gallery);
        assert_eq!(input.frame_index, None);
        assert!(!input.is_active);
    }

    #[test]
    fn test_photo_input_rejects_bad_values() {
        assert!(matches!(
            photo_input(&form(&[("kind", "panorama")])),
            Err(AppError::InvalidField { field: "kind", .. })
        ));
        assert!(matches!(
            photo_input(&form(&[("frame_index", "one")])),
            Err(AppError::InvalidField {
                field: "frame_index",
                ..
            })
        ));
    }
}
