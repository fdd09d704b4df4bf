//! HTTP layer for the museum catalog.
//!
//! - **Public endpoints**: localized exhibit lists and pages, the 360 viewer
//!   manifest, language switching
//! - **Admin endpoints**: JSON CRUD for museums, blocks, sections, exhibits
//!   and photos, media uploads, QR regeneration
//! - **Extractors**: request language, multipart upload forms
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
