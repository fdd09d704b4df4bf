//! Museum administration.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use museum_common::AppResult;
use museum_core::{CatalogText, CreateMuseumInput, Page};
use museum_db::entities::museum;
use serde::Deserialize;

use super::page_bounds;
use crate::{middleware::AppState, response::{self, ApiResponse}};

#[derive(Debug, Deserialize)]
pub struct ListMuseumsQuery {
    pub q: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

async fn list_museums(
    State(state): State<AppState>,
    Query(query): Query<ListMuseumsQuery>,
) -> AppResult<ApiResponse<Page<museum::Model>>> {
    let (page, per_page) = page_bounds(query.page, query.per_page, state.page_size);
    let museums = state
        .museum_service
        .list(query.q.as_deref(), page, per_page)
        .await?;
    Ok(ApiResponse::ok(museums))
}

async fn create_museum(
    State(state): State<AppState>,
    Json(input): Json<CreateMuseumInput>,
) -> AppResult<ApiResponse<museum::Model>> {
    Ok(ApiResponse::created(state.museum_service.create(input).await?))
}

async fn get_museum(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<museum::Model>> {
    Ok(ApiResponse::ok(state.museum_service.get(&id).await?))
}

/// Update texts. The museum code is fixed once created.
async fn update_museum(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(text): Json<CatalogText>,
) -> AppResult<ApiResponse<museum::Model>> {
    Ok(ApiResponse::ok(state.museum_service.update(&id, text).await?))
}

async fn delete_museum(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.museum_service.delete(&id).await?;
    Ok(response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_museums).post(create_museum))
        .route(
            "/{id}",
            get(get_museum).patch(update_museum).delete(delete_museum),
        )
}
