//! Request extractors.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Multipart, Query},
    http::{header::ACCEPT_LANGUAGE, request::Parts},
};
use axum_extra::extract::CookieJar;
use museum_common::{AppError, AppResult};
use museum_core::{Language, PhotoUpload, resolve_language};
use serde::Deserialize;

use crate::middleware::AppState;

#[derive(Debug, Deserialize)]
struct LangQuery {
    lang: Option<String>,
}

/// Display language of the request.
///
/// Taken from the `lang` query parameter, then the language cookie, then
/// `Accept-Language`, then the configured default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lang(pub Language);

impl FromRequestParts<AppState> for Lang {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let explicit = Query::<LangQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.lang);
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie = jar
            .get(&state.language.cookie_name)
            .map(|c| c.value().to_string());
        let accept_language = parts
            .headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok());

        Ok(Self(resolve_language(
            explicit.as_deref(),
            cookie.as_deref(),
            accept_language,
            state.language.default_language,
        )))
    }
}

/// File and text fields of a multipart upload form.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<PhotoUpload>,
    pub fields: Vec<(String, String)>,
}

impl UploadForm {
    /// Read every part of the form. The part named `file` is the upload.
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();
            if name == "file" {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?
                    .to_vec();
                form.file = Some(PhotoUpload {
                    file_name,
                    content_type,
                    data,
                });
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.fields.push((name, text));
            }
        }

        Ok(form)
    }

    /// The uploaded file, required.
    pub fn take_file(&mut self) -> AppResult<PhotoUpload> {
        self.file
            .take()
            .ok_or_else(|| AppError::invalid_field("file", "No file provided"))
    }

    /// Value of a text field, `None` when absent or empty.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty() && *v != "null")
    }

    /// Boolean text field (`true`/`1`/`on`).
    #[must_use]
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.text(name)
            .map(|v| matches!(v, "true" | "1" | "on"))
    }
}
