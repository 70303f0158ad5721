use std::sync::Arc;

use axum::extract::{Extension, Path, Query};
use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;
use tenant_resolver_sdk::{ResolutionError, TenantStatus};

use crate::domain::directory::DirectoryService;
use crate::domain::error::DomainError;

use super::dto::{
    RegisterTenantRequest, SlugCheckDto, SlugCheckQuery, TenantContextDto, TenantDto,
    UpdateStatusRequest,
};
use super::error::{ApiResult, ProblemScope, resolution_error_to_problem};

pub async fn register_tenant(
    scope: ProblemScope,
    Extension(svc): Extension<Arc<DirectoryService>>,
    Json(req): Json<RegisterTenantRequest>,
) -> ApiResult<impl IntoResponse> {
    let record = svc.register(req.into()).await.map_err(|e| scope.domain(&e))?;
    Ok((StatusCode::CREATED, Json(TenantDto::from(record))))
}

pub async fn get_tenant(
    scope: ProblemScope,
    Extension(svc): Extension<Arc<DirectoryService>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<TenantDto>> {
    let record = svc.get(&slug).await.map_err(|e| scope.domain(&e))?;
    Ok(Json(record.into()))
}

pub async fn deactivate_tenant(
    scope: ProblemScope,
    Extension(svc): Extension<Arc<DirectoryService>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<TenantDto>> {
    let record = svc.deactivate(&slug).await.map_err(|e| scope.domain(&e))?;
    Ok(Json(record.into()))
}

pub async fn reactivate_tenant(
    scope: ProblemScope,
    Extension(svc): Extension<Arc<DirectoryService>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<TenantDto>> {
    let record = svc.reactivate(&slug).await.map_err(|e| scope.domain(&e))?;
    Ok(Json(record.into()))
}

pub async fn update_status(
    scope: ProblemScope,
    Extension(svc): Extension<Arc<DirectoryService>>,
    Path(slug): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<TenantDto>> {
    let result = match (req.status, req.subscription_ends_at) {
        (TenantStatus::Paid, Some(until)) => svc.activate_subscription(&slug, until).await,
        (TenantStatus::Paid, None) => Err(DomainError::validation(
            "subscription_ends_at",
            "required when status is paid",
        )),
        (status, _) => svc.set_status(&slug, status).await,
    };
    let record = result.map_err(|e| scope.domain(&e))?;
    Ok(Json(record.into()))
}

pub async fn check_slug(
    scope: ProblemScope,
    Extension(svc): Extension<Arc<DirectoryService>>,
    Query(q): Query<SlugCheckQuery>,
) -> ApiResult<Json<SlugCheckDto>> {
    let (validation, available) = svc.check_slug(&q.slug).await.map_err(|e| scope.domain(&e))?;
    Ok(Json(SlugCheckDto::new(validation, available)))
}

/// Tenant bound to the current request by the resolution layer.
pub async fn current_tenant(scope: ProblemScope) -> ApiResult<Json<TenantContextDto>> {
    let ctx = tenancy_context::current().ok_or_else(|| {
        resolution_error_to_problem(
            &ResolutionError::Internal("no tenant scope".to_owned()),
            &scope.instance,
            scope.trace_id.clone(),
        )
    })?;
    Ok(Json(ctx.into()))
}
