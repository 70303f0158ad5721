//! Tenant slug rules.
//!
//! Checks run on the trimmed, lowercased input, first failure wins:
//! blank, reserved word, character set, length, hyphen at either end.
//! Uniqueness is not checked here; the directory's unique index owns it.

use std::fmt;

use serde::Serialize;

pub const SLUG_MIN_LEN: usize = 3;
pub const SLUG_MAX_LEN: usize = 50;

/// Words that collide with static routes of the platform.
pub const RESERVED_SLUGS: &[&str] = &[
    "account",
    "admin",
    "api",
    "app",
    "assets",
    "auth",
    "billing",
    "dashboard",
    "docs",
    "health",
    "help",
    "login",
    "logout",
    "mail",
    "me",
    "public",
    "register",
    "root",
    "settings",
    "signin",
    "signup",
    "static",
    "status",
    "support",
    "system",
    "tenants",
    "www",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlugRejection {
    Blank,
    Reserved,
    InvalidCharacters,
    TooShort,
    TooLong,
    HyphenBoundary,
}

impl SlugRejection {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Blank => "slug must not be empty",
            Self::Reserved => "slug is a reserved word",
            Self::InvalidCharacters => {
                "slug may only contain lowercase letters, digits and hyphens"
            }
            Self::TooShort => "slug must be at least 3 characters long",
            Self::TooLong => "slug must be at most 50 characters long",
            Self::HyphenBoundary => "slug must not start or end with a hyphen",
        }
    }
}

impl fmt::Display for SlugRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of [`validate_slug`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlugValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SlugRejection>,
    /// The trimmed, lowercased candidate.
    pub normalized: String,
}

impl SlugValidation {
    /// The normalized slug when valid.
    ///
    /// # Errors
    /// The first rule the candidate broke.
    pub fn into_result(self) -> Result<String, SlugRejection> {
        match self.reason {
            None => Ok(self.normalized),
            Some(reason) => Err(reason),
        }
    }
}

/// Canonical form used for lookups and storage.
#[must_use]
pub fn normalize_slug(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[must_use]
pub fn validate_slug(candidate: &str) -> SlugValidation {
    let normalized = normalize_slug(candidate);
    let reason = first_violation(&normalized);
    SlugValidation {
        valid: reason.is_none(),
        reason,
        normalized,
    }
}

fn first_violation(slug: &str) -> Option<SlugRejection> {
    if slug.is_empty() {
        return Some(SlugRejection::Blank);
    }
    if RESERVED_SLUGS.contains(&slug) {
        return Some(SlugRejection::Reserved);
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Some(SlugRejection::InvalidCharacters);
    }
    // ASCII only from here on, so byte length equals char count.
    if slug.len() < SLUG_MIN_LEN {
        return Some(SlugRejection::TooShort);
    }
    if slug.len() > SLUG_MAX_LEN {
        return Some(SlugRejection::TooLong);
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Some(SlugRejection::HyphenBoundary);
    }
    None
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn reason(s: &str) -> Option<SlugRejection> {
        validate_slug(s).reason
    }

    #[test]
    fn accepts_plain_slugs() {
        let v = validate_slug("cafe-kopi");
        assert!(v.valid);
        assert_eq!(v.reason, None);
        assert_eq!(v.normalized, "cafe-kopi");
        assert!(validate_slug("abc").valid);
        assert!(validate_slug("toko-123").valid);
        assert!(validate_slug(&"a".repeat(50)).valid);
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        let v = validate_slug("  Cafe-Kopi\t");
        assert!(v.valid);
        assert_eq!(v.normalized, "cafe-kopi");
    }

    #[test]
    fn blank_first() {
        assert_eq!(reason(""), Some(SlugRejection::Blank));
        assert_eq!(reason("   "), Some(SlugRejection::Blank));
    }

    #[test]
    fn reserved_in_any_casing() {
        for s in ["admin", "ADMIN", " Admin ", "aDmIn\n"] {
            assert_eq!(reason(s), Some(SlugRejection::Reserved), "{s:?}");
        }
    }

    #[test]
    fn reserved_wins_over_length() {
        assert_eq!(reason("me"), Some(SlugRejection::Reserved));
    }

    #[test]
    fn charset_before_length() {
        assert_eq!(reason("a_"), Some(SlugRejection::InvalidCharacters));
        assert_eq!(reason("café"), Some(SlugRejection::InvalidCharacters));
        assert_eq!(reason("my shop"), Some(SlugRejection::InvalidCharacters));
    }

    #[test]
    fn length_bounds() {
        assert_eq!(reason("ab"), Some(SlugRejection::TooShort));
        assert_eq!(reason(&"a".repeat(51)), Some(SlugRejection::TooLong));
    }

    #[test]
    fn hyphen_boundaries() {
        assert_eq!(reason("-shop"), Some(SlugRejection::HyphenBoundary));
        assert_eq!(reason("shop-"), Some(SlugRejection::HyphenBoundary));
        assert!(validate_slug("sh-op").valid);
    }

    #[test]
    fn into_result_carries_reason() {
        assert_eq!(validate_slug("Shop-1").into_result(), Ok("shop-1".to_owned()));
        assert_eq!(
            validate_slug("api").into_result(),
            Err(SlugRejection::Reserved)
        );
    }
}
