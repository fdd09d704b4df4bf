//! Photo administration.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use museum_common::AppResult;
use museum_core::UpdatePhotoInput;
use museum_db::entities::exhibit_photo;

use crate::{
    middleware::AppState,
    response::{self, ApiResponse},
};

async fn get_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<exhibit_photo::Model>> {
    Ok(ApiResponse::ok(state.photo_service.get(&id).await?))
}

/// Toggle, reorder or reclassify a photo.
async fn update_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdatePhotoInput>,
) -> AppResult<ApiResponse<exhibit_photo::Model>> {
    Ok(ApiResponse::ok(state.photo_service.update(&id, input).await?))
}

async fn delete_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.photo_service.delete(&id).await?;
    Ok(response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{id}",
        get(get_photo).patch(update_photo).delete(delete_photo),
    )
}
