//! Axum layer binding each request to its tenant.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::header::{HeaderName, HeaderValue, USER_AGENT};
use http::HeaderMap;
use tenancy_context::TenantContext;
use tenancy_errors::finalize;
use tenant_resolver_sdk::{CallerIdentity, PlatformAdmin, RequestMeta, ResolutionError};
use tracing::Instrument;
use uuid::Uuid;

use super::error::resolution_error_to_problem;
use crate::domain::service::Service;
use crate::errors;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const TENANT_SLUG_HEADER: &str = "x-tenant-slug";

#[derive(Clone)]
pub struct TenantResolutionState {
    pub service: Arc<Service>,
    pub header_name: HeaderName,
    pub expose_context_header: bool,
}

fn header_str(headers: &HeaderMap, name: impl http::header::AsHeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

fn client_ip(req: &Request) -> Option<String> {
    header_str(req.headers(), "x-forwarded-for")
        .and_then(|v| v.split(',').next().map(|s| s.trim().to_owned()))
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0.ip().to_string())
        })
}

fn request_meta(req: &Request) -> RequestMeta {
    RequestMeta {
        method: req.method().to_string(),
        path: req.uri().path().to_owned(),
        client_ip: client_ip(req),
        user_agent: header_str(req.headers(), USER_AGENT),
        correlation_id: header_str(req.headers(), REQUEST_ID_HEADER)
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
    }
}

fn echo_request_id(resp: &mut Response, correlation_id: &str) {
    if let Ok(v) = HeaderValue::from_str(correlation_id) {
        resp.headers_mut().insert(REQUEST_ID_HEADER, v);
    }
}

fn reject(err: &ResolutionError, meta: &RequestMeta) -> Response {
    let mut resp =
        resolution_error_to_problem(err, &meta.path, Some(meta.correlation_id.clone()))
            .into_response();
    echo_request_id(&mut resp, &meta.correlation_id);
    resp
}

/// Resolve the tenant header, then run the rest of the stack inside the
/// tenant's context scope.
///
/// Rejections short-circuit with `application/problem+json` before any
/// handler or body extraction runs. On success the `TenantContext` is also
/// placed in request and response extensions.
pub async fn tenant_resolution_middleware(
    State(state): State<TenantResolutionState>,
    mut req: Request,
    next: Next,
) -> Response {
    let meta = request_meta(&req);
    let span = tracing::info_span!(
        "tenant_request",
        correlation_id = %meta.correlation_id,
        method = %meta.method,
        path = %meta.path,
    );

    async move {
        let claimed = req
            .headers()
            .get(&state.header_name)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);
        let caller = req.extensions().get::<CallerIdentity>().cloned();

        let ctx = match state
            .service
            .resolve(claimed.as_deref(), caller.as_ref(), &meta)
            .await
        {
            Ok(ctx) => ctx,
            Err(err) => return reject(&err, &meta),
        };

        req.extensions_mut().insert(ctx.clone());
        // Handlers finalize problems with the same correlation id.
        if let Ok(v) = HeaderValue::from_str(&meta.correlation_id) {
            req.headers_mut().insert(REQUEST_ID_HEADER, v);
        }
        let mut resp = match tenancy_context::run_with(ctx.clone(), next.run(req)).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!(
                    category = "tenant_resolver",
                    event = "resolution.error",
                    error = %e,
                    "context scope could not be installed"
                );
                return reject(&ResolutionError::Internal(e.to_string()), &meta);
            }
        };

        if state.expose_context_header
            && let Ok(v) = HeaderValue::from_str(ctx.slug())
        {
            resp.headers_mut().insert(TENANT_SLUG_HEADER, v);
        }
        resp.extensions_mut().insert::<TenantContext>(ctx);
        echo_request_id(&mut resp, &meta.correlation_id);
        resp
    }
    .instrument(span)
    .await
}

/// Admit only requests carrying a [`PlatformAdmin`] extension.
///
/// The refusal is the same for every path, so it reveals nothing about which
/// tenants exist.
pub async fn require_platform_admin(req: Request, next: Next) -> Response {
    if req.extensions().get::<PlatformAdmin>().is_some() {
        return next.run(req).await;
    }

    let meta = request_meta(&req);
    tracing::warn!(
        category = "tenant_directory",
        event = "admin.denied",
        correlation_id = %meta.correlation_id,
        method = %meta.method,
        path = %meta.path,
        client_ip = meta.client_ip.as_deref().unwrap_or(""),
        "tenant administration without admin identity"
    );
    let problem = errors::ADMIN_ACCESS_REQUIRED
        .as_problem("Tenant administration requires a platform administrator");
    let mut resp =
        finalize(problem, &meta.path, Some(meta.correlation_id.clone())).into_response();
    echo_request_id(&mut resp, &meta.correlation_id);
    resp
}
