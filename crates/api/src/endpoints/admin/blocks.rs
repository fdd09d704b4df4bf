//! Block administration.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use museum_common::AppResult;
use museum_core::{CatalogText, CreateBlockInput, Page};
use museum_db::entities::museum_block;
use serde::Deserialize;

use super::page_bounds;
use crate::{middleware::AppState, response::{self, ApiResponse}};

#[derive(Debug, Deserialize)]
pub struct ListBlocksQuery {
    pub museum: Option<String>,
    pub q: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

async fn list_blocks(
    State(state): State<AppState>,
    Query(query): Query<ListBlocksQuery>,
) -> AppResult<ApiResponse<Page<museum_block::Model>>> {
    let (page, per_page) = page_bounds(query.page, query.per_page, state.page_size);
    let blocks = state
        .block_service
        .list(query.museum.as_deref(), query.q.as_deref(), page, per_page)
        .await?;
    Ok(ApiResponse::ok(blocks))
}

async fn create_block(
    State(state): State<AppState>,
    Json(input): Json<CreateBlockInput>,
) -> AppResult<ApiResponse<museum_block::Model>> {
    Ok(ApiResponse::created(state.block_service.create(input).await?))
}

async fn get_block(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<museum_block::Model>> {
    Ok(ApiResponse::ok(state.block_service.get(&id).await?))
}

async fn update_block(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(text): Json<CatalogText>,
) -> AppResult<ApiResponse<museum_block::Model>> {
    Ok(ApiResponse::ok(state.block_service.update(&id, text).await?))
}

async fn delete_block(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.block_service.delete(&id).await?;
    Ok(response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_blocks).post(create_block))
        .route(
            "/{id}",
            get(get_block).patch(update_block).delete(delete_block),
        )
}
