//! Tenant Resolver SDK
//!
//! Public surface of the `tenant-resolver` module:
//!
//! - [`TenantDirectory`] - storage contract for tenant records
//! - [`TenantRecord`], [`TenantStatus`], [`TenantPatch`], [`CallerIdentity`],
//!   [`PlatformAdmin`], [`RequestMeta`] - models
//! - [`validate_slug`] - slug syntax and reserved-word rules
//! - [`ResolutionError`], [`TenantDirectoryError`] - error types
//!
//! ## Usage
//!
//! ```ignore
//! use tenant_resolver_sdk::{validate_slug, SlugRejection};
//!
//! let check = validate_slug("  Cafe-Kopi ");
//! assert!(check.valid);
//! assert_eq!(check.normalized, "cafe-kopi");
//!
//! assert_eq!(validate_slug("ADMIN").reason, Some(SlugRejection::Reserved));
//! ```

pub mod api;
pub mod error;
pub mod models;
pub mod slug;

pub use api::TenantDirectory;
pub use error::{ResolutionError, TenantDirectoryError};
pub use models::{
    CallerIdentity, NewTenant, PlatformAdmin, RequestMeta, TenantPatch, TenantRecord, TenantStatus,
};
pub use slug::{RESERVED_SLUGS, SlugRejection, SlugValidation, normalize_slug, validate_slug};
