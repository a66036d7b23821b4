//! Course slugs: the human-chosen identifier used in URLs.
//!
//! A slug is one or more groups of lowercase ASCII letters and digits joined
//! by single hyphens, i.e. `^[a-z0-9]+(-[a-z0-9]+)*$`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation error returned by [`CourseSlug::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlugValidationError {
    /// The slug was empty.
    #[error("course ID must not be empty")]
    Empty,
    /// The slug contained characters or hyphen placement outside the grammar.
    #[error("course ID must contain only lowercase letters, numbers, and single hyphens")]
    Malformed,
}

/// Return `true` when `value` matches the slug grammar.
#[must_use]
pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value.split('-').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit())
        })
}

/// Validated course slug.
///
/// # Examples
/// ```
/// use courseware::domain::CourseSlug;
///
/// assert!(CourseSlug::parse("rust-101").is_ok());
/// assert!(CourseSlug::parse("Rust 101").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseSlug(String);

impl CourseSlug {
    /// Validate `raw` without trimming; callers trim form input first.
    pub fn parse(raw: impl Into<String>) -> Result<Self, SlugValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(SlugValidationError::Empty);
        }
        if !is_valid_slug(&raw) {
            return Err(SlugValidationError::Malformed);
        }
        Ok(Self(raw))
    }

    /// Borrow the slug text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CourseSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CourseSlug> for String {
    fn from(value: CourseSlug) -> Self {
        value.0
    }
}

impl TryFrom<String> for CourseSlug {
    type Error = SlugValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}
