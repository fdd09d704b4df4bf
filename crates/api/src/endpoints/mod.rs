//! API endpoints.

mod admin;
mod public;

use axum::Router;

use crate::middleware::AppState;

/// Create the application router: visitor pages at the root, the admin API
/// under `/api/admin`.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/api/admin", admin::router())
        .merge(public::router())
}
