//! Error types for the tenant resolver module.

use thiserror::Error;

use crate::slug::SlugRejection;

/// Why an inbound operation could not be bound to a tenant.
///
/// Messages are safe to show to external callers; they never include ids,
/// emails or storage details.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolutionError {
    /// No tenant identifier was supplied.
    #[error("tenant identifier is missing")]
    HeaderMissing,

    /// Unknown or inactive tenant. The two cases are not distinguished.
    #[error("tenant not found")]
    NotFound,

    /// The authenticated caller belongs to a different tenant.
    #[error("access to the requested tenant is not allowed")]
    CrossTenantAccess,

    /// Unexpected fault while resolving. The payload is for server-side logs.
    #[error("tenant resolution failed: {0}")]
    Internal(String),
}

impl ResolutionError {
    /// Stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::HeaderMissing => "TENANT_HEADER_MISSING",
            Self::NotFound => "TENANT_NOT_FOUND",
            Self::CrossTenantAccess => "CROSS_TENANT_ACCESS",
            Self::Internal(_) => "TENANT_RESOLUTION_ERROR",
        }
    }

    /// HTTP status the rejection maps to.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::HeaderMissing => 400,
            Self::NotFound => 404,
            Self::CrossTenantAccess => 403,
            Self::Internal(_) => 500,
        }
    }
}

/// Errors raised by tenant directory storage and lifecycle operations.
#[derive(Debug, Error)]
pub enum TenantDirectoryError {
    /// No tenant with this slug (or id) exists.
    #[error("tenant not found: {slug}")]
    NotFound { slug: String },

    /// The slug is already used by another tenant.
    #[error("slug already taken: {slug}")]
    SlugTaken { slug: String },

    /// The slug failed validation.
    #[error("invalid slug '{slug}': {reason}")]
    InvalidSlug { slug: String, reason: SlugRejection },

    /// Invalid input other than the slug.
    #[error("validation failed on '{field}': {message}")]
    Validation { field: String, message: String },

    /// Storage backend failure.
    #[error("storage error: {0}")]
    Storage(String),
}
