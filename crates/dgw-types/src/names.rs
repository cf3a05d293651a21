//! Validation of names that become path segments on disk.
//!
//! Datasets, channels, manifest ids, namespaces, logical ids and dates are all
//! used verbatim as file or directory names, so each must be a single safe
//! path component:
//! - non-empty
//! - no whitespace, control characters, `/`, `\`, `:` or `*`
//! - no `..`
//! - must not start with `.`

use crate::error::TypeError;

/// Characters that are forbidden anywhere in a segment.
const FORBIDDEN_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Validate `name` as a single path segment. `what` names the field in errors.
///
/// ```
/// use dgw_types::names::validate_segment;
///
/// assert!(validate_segment("dataset", "core").is_ok());
/// assert!(validate_segment("date", "2024-03-01").is_ok());
/// assert!(validate_segment("dataset", "../etc").is_err());
/// ```
pub fn validate_segment(what: &'static str, name: &str) -> Result<(), TypeError> {
    let reject = |reason: String| {
        Err(TypeError::InvalidName {
            what,
            name: name.to_string(),
            reason,
        })
    };

    if name.is_empty() {
        return reject("must not be empty".into());
    }
    if let Some(ch) = name
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || FORBIDDEN_CHARS.contains(c))
    {
        return reject(format!("contains forbidden character: {ch:?}"));
    }
    if name.contains("..") {
        return reject("must not contain '..'".into());
    }
    if name.starts_with('.') {
        return reject("must not start with '.'".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_names() {
        for name in ["core", "prod", "e1", "20240301-120000", "user_42", "v1.0"] {
            assert!(validate_segment("name", name).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_traversal_and_separators() {
        for name in ["", "..", "a/b", "a\\b", ".hidden", "a..b", "has space", "x\ny"] {
            assert!(validate_segment("name", name).is_err(), "{name:?}");
        }
    }

    #[test]
    fn error_names_the_field() {
        let err = validate_segment("dataset", "a/b").unwrap_err();
        assert!(err.to_string().contains("dataset"));
    }
}
