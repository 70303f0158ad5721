//! Tenant resolver module.
//!
//! Resolves the tenant of every inbound request, installs it in the
//! context carrier and manages the tenant directory lifecycle. The public
//! contract lives in `tenant-resolver-sdk` and is re-exported here.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub use tenant_resolver_sdk::{
    CallerIdentity, NewTenant, PlatformAdmin, RequestMeta, ResolutionError, TenantDirectory,
    TenantDirectoryError, TenantPatch, TenantRecord, TenantStatus,
};

pub mod module;
pub use module::TenantResolverModule;

pub mod api;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;

pub use config::TenantResolverConfig;
