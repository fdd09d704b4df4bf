//! Admin JSON API for curators.

mod blocks;
mod exhibits;
mod museums;
mod photos;
mod sections;

use axum::Router;

use crate::middleware::AppState;

/// Requested page (1-based) and page size of an admin list, capped at 100.
fn page_bounds(page: Option<u64>, per_page: Option<u64>, default_per_page: u64) -> (u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(default_per_page).clamp(1, 100);
    (page, per_page)
}

/// Admin router, mounted under `/api/admin`.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/museums", museums::router())
        .nest("/blocks", blocks::router())
        .nest("/sections", sections::router())
        .nest("/exhibits", exhibits::router())
        .nest("/photos", photos::router())
}
