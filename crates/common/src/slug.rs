//! Validation of museum and block codes.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{AppError, AppResult};

/// Maximum length of a museum or block code.
pub const MAX_CODE_LEN: usize = 32;

static CODE_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[A-Za-z0-9_]+$").unwrap()
});

/// Check that `value` is usable as a museum or block code (e.g. `ISC`, `REN2`).
///
/// Codes end up in exhibit slugs and public URLs, so only ASCII letters,
/// digits and `_` are accepted. `-` separates the parts of an exhibit code
/// and would make `A-B` + `C` read the same as `A` + `B-C`.
pub fn validate_code(field: &'static str, value: &str) -> AppResult<()> {
    if value.is_empty() {
        return Err(AppError::invalid_field(field, "This field is required"));
    }
    if value.len() > MAX_CODE_LEN {
        return Err(AppError::invalid_field(
            field,
            format!("Must be at most {MAX_CODE_LEN} characters"),
        ));
    }
    if !CODE_RE.is_match(value) {
        return Err(AppError::invalid_field(
            field,
            "Only letters, digits and '_' are allowed",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_codes() {
        assert!(validate_code("slug", "ISC").is_ok());
        assert!(validate_code("slug", "REN2").is_ok());
        assert!(validate_code("slug", "hall_b1").is_ok());
    }

    #[test]
    fn test_rejects_empty_and_punctuation() {
        assert!(matches!(
            validate_code("slug", ""),
            Err(AppError::InvalidField { field: "slug", .. })
        ));
        assert!(validate_code("slug", "IS C").is_err());
        assert!(validate_code("slug", "ISC.1").is_err());
        assert!(validate_code("slug", "ISC/1").is_err());
        assert!(validate_code("slug", "ISC-2").is_err());
    }

    #[test]
    fn test_rejects_long_codes() {
        let long = "A".repeat(MAX_CODE_LEN + 1);
        assert!(validate_code("slug", &long).is_err());
    }
}
