//! Section administration and the section picker.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use museum_common::AppResult;
use museum_core::{CreateSectionInput, Page, SectionOption, UpdateSectionInput};
use museum_db::entities::museum_section;
use museum_db::repositories::SectionFilter;
use serde::Deserialize;

use super::page_bounds;
use crate::{middleware::AppState, response::{self, ApiResponse}};

#[derive(Debug, Deserialize)]
pub struct ListSectionsQuery {
    pub museum: Option<String>,
    pub block: Option<String>,
    pub q: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

async fn list_sections(
    State(state): State<AppState>,
    Query(query): Query<ListSectionsQuery>,
) -> AppResult<ApiResponse<Page<museum_section::Model>>> {
    let (page, per_page) = page_bounds(query.page, query.per_page, state.page_size);
    let filter = SectionFilter {
        museum_id: query.museum,
        block_id: query.block,
        search: query.q,
    };
    let sections = state.section_service.list(&filter, page, per_page).await?;
    Ok(ApiResponse::ok(sections))
}

#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    pub block: Option<String>,
    pub q: Option<String>,
}

/// Sections of the chosen block matching `q`. Empty without a block.
async fn autocomplete(
    State(state): State<AppState>,
    Query(query): Query<AutocompleteQuery>,
) -> AppResult<ApiResponse<Vec<SectionOption>>> {
    let options = state
        .section_service
        .autocomplete(query.block.as_deref(), query.q.as_deref())
        .await?;
    Ok(ApiResponse::ok(options))
}

async fn create_section(
    State(state): State<AppState>,
    Json(input): Json<CreateSectionInput>,
) -> AppResult<ApiResponse<museum_section::Model>> {
    Ok(ApiResponse::created(state.section_service.create(input).await?))
}

async fn get_section(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<museum_section::Model>> {
    Ok(ApiResponse::ok(state.section_service.get(&id).await?))
}

async fn update_section(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateSectionInput>,
) -> AppResult<ApiResponse<museum_section::Model>> {
    Ok(ApiResponse::ok(state.section_service.update(&id, input).await?))
}

async fn delete_section(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.section_service.delete(&id).await?;
    Ok(response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sections).post(create_section))
        .route("/autocomplete", get(autocomplete))
        .route(
            "/{id}",
            get(get_section).patch(update_section).delete(delete_section),
        )
}
