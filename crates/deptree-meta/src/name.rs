//! Validation for dependency names
//!
//! A name keys the registry and also becomes a directory name under the
//! workspace or fetch cache, so it must be a single safe path segment.

use crate::ParseError;

/// Check that `name` can be used as a dependency identifier.
///
/// Allowed characters are ASCII letters, digits, `_`, `-`, `.` and `+`.
/// The segments `.` and `..` are rejected.
pub fn validate_dependency_name(name: &str) -> Result<(), ParseError> {
    let invalid = |reason: &str| ParseError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(ParseError::MissingName);
    }
    if name == "." || name == ".." {
        return Err(invalid("reserved path segment"));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+')))
    {
        return Err(invalid(&format!("character '{bad}' is not allowed")));
    }
    Ok(())
}
