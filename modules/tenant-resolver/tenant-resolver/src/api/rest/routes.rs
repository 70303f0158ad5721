use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::{Extension, Router};

use crate::domain::directory::DirectoryService;

use super::handlers;
use super::middleware::{
    TenantResolutionState, require_platform_admin, tenant_resolution_middleware,
};

/// Platform-level tenant administration. Not tenant-scoped; every route
/// requires a [`PlatformAdmin`](tenant_resolver_sdk::PlatformAdmin) caller.
pub fn admin_router(directory: Arc<DirectoryService>) -> Router {
    Router::new()
        .route("/tenants", post(handlers::register_tenant))
        .route("/tenants/slug-check", get(handlers::check_slug))
        .route("/tenants/{slug}", get(handlers::get_tenant))
        .route("/tenants/{slug}/deactivate", post(handlers::deactivate_tenant))
        .route("/tenants/{slug}/reactivate", post(handlers::reactivate_tenant))
        .route("/tenants/{slug}/status", put(handlers::update_status))
        .route_layer(axum::middleware::from_fn(require_platform_admin))
        .layer(Extension(directory))
}

/// Put `router` behind tenant resolution and add `GET /me/tenant`.
pub fn tenant_scoped(router: Router, state: TenantResolutionState) -> Router {
    router
        .route("/me/tenant", get(handlers::current_tenant))
        .layer(axum::middleware::from_fn_with_state(
            state,
            tenant_resolution_middleware,
        ))
}
