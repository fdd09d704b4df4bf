//! Visitor-facing endpoints: exhibit lists, exhibit pages reached through QR
//! codes, the 360 viewer manifest and language switching.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, header},
    response::Redirect,
    routing::get,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use museum_common::AppResult;
use museum_core::{
    Ci360Manifest, ExhibitCard, ExhibitDetail, Language, Page, PublicListQuery, SectionOption,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{extractors::Lang, middleware::AppState, response::ApiResponse};

/// Language cookie lifetime.
const LANGUAGE_COOKIE_DAYS: i64 = 365;

/// Exhibit list filters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub q: Option<String>,
    pub block: Option<String>,
    pub section: Option<String>,
}

/// Exhibit list page.
#[derive(Serialize)]
pub struct ExhibitListResponse {
    pub lang: Language,
    pub museum_slug: Option<String>,
    pub q: Option<String>,
    pub block: Option<String>,
    pub section: Option<String>,
    pub exhibits: Page<ExhibitCard>,
}

async fn list(
    state: &AppState,
    lang: Language,
    museum_slug: Option<String>,
    query: ListQuery,
) -> AppResult<ApiResponse<ExhibitListResponse>> {
    let q = query.q.map(|q| q.trim().to_string()).filter(|q| !q.is_empty());
    let filters = PublicListQuery {
        museum_slug: museum_slug.clone(),
        q: q.clone(),
        block: query.block.clone(),
        section: query.section.clone(),
        page: query.page,
    };
    let exhibits = state.exhibit_service.public_list(&filters, lang).await?;

    Ok(ApiResponse::ok(ExhibitListResponse {
        lang,
        museum_slug,
        q,
        block: query.block,
        section: query.section,
        exhibits,
    }))
}

/// Published exhibits of every museum.
async fn list_exhibits(
    State(state): State<AppState>,
    Lang(lang): Lang,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<ExhibitListResponse>> {
    list(&state, lang, None, query).await
}

/// Published exhibits of one museum.
async fn list_museum_exhibits(
    State(state): State<AppState>,
    Path(museum_slug): Path<String>,
    Lang(lang): Lang,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<ExhibitListResponse>> {
    list(&state, lang, Some(museum_slug), query).await
}

/// Exhibit page, the target of printed QR codes.
async fn exhibit_detail(
    State(state): State<AppState>,
    Path((museum_slug, exhibit_slug)): Path<(String, String)>,
    Lang(lang): Lang,
) -> AppResult<ApiResponse<ExhibitDetail>> {
    let detail = state
        .exhibit_service
        .public_detail(&museum_slug, &exhibit_slug, lang)
        .await?;
    Ok(ApiResponse::ok(detail))
}

/// Initialization data for the 360 viewer widget.
async fn ci360_manifest(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Ci360Manifest>> {
    Ok(Json(state.exhibit_service.manifest(&slug).await?))
}

#[derive(Debug, Deserialize)]
pub struct SectionsQuery {
    pub block: Option<String>,
}

/// Sections of a block, for the section picker.
async fn sections_json(
    State(state): State<AppState>,
    Query(query): Query<SectionsQuery>,
) -> AppResult<ApiResponse<Vec<SectionOption>>> {
    let sections = match query.block.as_deref().filter(|b| !b.is_empty()) {
        Some(block) => state.section_service.sections_by_block(block).await?,
        None => Vec::new(),
    };
    Ok(ApiResponse::ok(sections))
}

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Whether `target` stays on this site: a local path, or an absolute URL
/// pointing at `host`.
fn is_safe_redirect(target: &str, host: Option<&str>) -> bool {
    if target.starts_with('/') {
        return !target.starts_with("//") && !target.starts_with("/\\");
    }
    match (url::Url::parse(target), host) {
        (Ok(url), Some(host)) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|h| {
                    let authority = url
                        .port()
                        .map_or_else(|| h.to_string(), |p| format!("{h}:{p}"));
                    authority == host || h == host
                })
        }
        _ => false,
    }
}

/// Store the interface language and go back.
///
/// Redirects to `next`, then the `Referer`, then `/`. Unsupported codes
/// select the default language.
async fn set_language(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(query): Query<NextQuery>,
    headers: HeaderMap,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    let language = Language::parse(&code).unwrap_or(state.language.default_language);
    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok());
    let referer = headers.get(header::REFERER).and_then(|v| v.to_str().ok());

    let target = query
        .next
        .as_deref()
        .filter(|next| is_safe_redirect(next, host))
        .or_else(|| referer.filter(|r| is_safe_redirect(r, host)))
        .unwrap_or("/")
        .to_string();

    debug!(lang = %language, target = %target, "Language selected");

    let cookie = Cookie::build((state.language.cookie_name.clone(), language.code()))
        .path("/")
        .max_age(time::Duration::days(LANGUAGE_COOKIE_DAYS))
        .same_site(SameSite::Lax);

    (jar.add(cookie), Redirect::to(&target))
}

/// Public router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_exhibits))
        .route("/sections-json", get(sections_json))
        .route("/i18n/{lang}", get(set_language))
        .route("/exhibits/api/{slug}/ci360.json", get(ci360_manifest))
        .route("/{museum_slug}", get(list_museum_exhibits))
        .route("/{museum_slug}/{exhibit_slug}", get(exhibit_detail))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_redirect_local_paths() {
        assert!(is_safe_redirect("/ISC/ISC-REN2-1.0001", None));
        assert!(!is_safe_redirect("//evil.example/", None));
        assert!(!is_safe_redirect("/\\evil.example", None));
    }

    #[test]
    fn test_safe_redirect_same_host_only() {
        assert!(is_safe_redirect(
            "https://museum.example/ISC",
            Some("museum.example")
        ));
        assert!(is_safe_redirect(
            "http://localhost:8000/ISC",
            Some("localhost:8000")
        ));
        assert!(!is_safe_redirect(
            "https://evil.example/ISC",
            Some("museum.example")
        ));
        assert!(!is_safe_redirect("https://museum.example/ISC", None));
        assert!(!is_safe_redirect("javascript:alert(1)", Some("museum.example")));
    }
}
