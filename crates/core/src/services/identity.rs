//! Exhibit identity: per-group sequence numbers and human-readable codes.
//!
//! An exhibit code looks like `ISC-REN2-1.0001`: museum code, block code,
//! section number and the four-digit position of the exhibit within its
//! (block, section) group. Identities are assigned once, on first insert.

use std::future::Future;

use museum_common::{AppError, AppResult};
use museum_db::entities::exhibit;
use tracing::warn;

/// Sequence number for the next exhibit of a group whose highest number is `last`.
#[must_use]
pub fn next_sequence_no(last: Option<i32>) -> i32 {
    last.map_or(1, |n| n.max(0) + 1)
}

/// Build an exhibit code from its parts.
#[must_use]
pub fn build_slug(museum_slug: &str, block_slug: &str, code_num: i32, sequence_no: i32) -> String {
    format!("{museum_slug}-{block_slug}-{code_num}.{sequence_no:04}")
}

/// The immutable identity of an exhibit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExhibitIdentity {
    pub sequence_no: i32,
    pub slug: String,
}

impl ExhibitIdentity {
    /// Identity already stored on an exhibit, if one was assigned.
    #[must_use]
    pub fn of(model: &exhibit::Model) -> Option<Self> {
        (model.sequence_no > 0 && !model.slug.is_empty()).then(|| Self {
            sequence_no: model.sequence_no,
            slug: model.slug.clone(),
        })
    }

    /// Keep `existing` when present, otherwise derive a new identity from the
    /// group's highest sequence number.
    ///
    /// Resaving an exhibit never renumbers it, even if its block or section
    /// changed in the meantime.
    #[must_use]
    pub fn assign_once(
        existing: Option<Self>,
        museum_slug: &str,
        block_slug: &str,
        code_num: i32,
        last: Option<i32>,
    ) -> Self {
        if let Some(identity) = existing {
            return identity;
        }
        let sequence_no = next_sequence_no(last);
        Self {
            slug: build_slug(museum_slug, block_slug, code_num, sequence_no),
            sequence_no,
        }
    }
}

/// Run `op` until it succeeds or fails with something other than a conflict.
///
/// `op` receives the 1-based attempt number. After `attempts` conflicting
/// tries the last conflict is returned.
pub async fn retry_on_conflict<T, F, Fut>(attempts: u32, mut op: F) -> AppResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Err(AppError::Conflict(detail)) if attempt < attempts => {
                warn!(attempt, detail = %detail, "Exhibit identity taken, retrying");
                attempt += 1;
            }
            Err(AppError::Conflict(detail)) => {
                return Err(AppError::Conflict(format!(
                    "Could not assign a unique exhibit code after {attempts} attempts: {detail}"
                )));
            }
            other => return other,
        }
    }
}
