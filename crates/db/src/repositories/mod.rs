//! Database repositories.

mod block;
mod exhibit;
mod exhibit_photo;
mod museum;
mod section;

pub use block::BlockRepository;
pub use exhibit::{ExhibitFilter, ExhibitRepository};
pub use exhibit_photo::ExhibitPhotoRepository;
pub use museum::MuseumRepository;
pub use section::{SectionFilter, SectionRepository};

use sea_orm::sea_query::{Expr, extension::postgres::PgExpr};
use sea_orm::{Condition, EntityTrait};

/// Escape `LIKE` metacharacters in user input.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Case-insensitive substring match on any of `columns`.
pub(crate) fn search_condition<E>(
    entity: E,
    columns: impl IntoIterator<Item = E::Column>,
    query: &str,
) -> Condition
where
    E: EntityTrait + Copy,
{
    let pattern = format!("%{}%", escape_like(query.trim()));
    columns.into_iter().fold(Condition::any(), |cond, column| {
        cond.add(Expr::col((entity, column)).ilike(pattern.clone()))
    })
}

/// Normalize an optional search query: blank strings mean "no search".
pub(crate) fn non_blank(query: Option<&str>) -> Option<&str> {
    query.map(str::trim).filter(|q| !q.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("ISC"), "ISC");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  statue ")), Some("statue"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
