use tenant_resolver_sdk::{SlugRejection, TenantDirectoryError};
use thiserror::Error;

/// Errors of tenant lifecycle operations.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("tenant not found: {slug}")]
    NotFound { slug: String },

    #[error("slug already taken: {slug}")]
    SlugTaken { slug: String },

    #[error("invalid slug '{slug}': {reason}")]
    InvalidSlug { slug: String, reason: SlugRejection },

    #[error("validation failed on '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("directory error: {0}")]
    Directory(String),
}

impl DomainError {
    pub fn not_found(slug: impl Into<String>) -> Self {
        Self::NotFound { slug: slug.into() }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<TenantDirectoryError> for DomainError {
    fn from(e: TenantDirectoryError) -> Self {
        match e {
            TenantDirectoryError::NotFound { slug } => Self::NotFound { slug },
            TenantDirectoryError::SlugTaken { slug } => Self::SlugTaken { slug },
            TenantDirectoryError::InvalidSlug { slug, reason } => Self::InvalidSlug { slug, reason },
            TenantDirectoryError::Validation { field, message } => {
                Self::Validation { field, message }
            }
            TenantDirectoryError::Storage(msg) => Self::Directory(msg),
        }
    }
}
