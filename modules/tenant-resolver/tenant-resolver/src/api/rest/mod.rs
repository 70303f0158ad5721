pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::{
    TenantResolutionState, require_platform_admin, tenant_resolution_middleware,
};
