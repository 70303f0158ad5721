use std::convert::Infallible;

use axum::extract::FromRequestParts;
use http::request::Parts;
use tenancy_errors::{Problem, ValidationViolation, finalize};
use tenant_resolver_sdk::ResolutionError;

use crate::domain::error::DomainError;
use crate::errors;

use super::middleware::REQUEST_ID_HEADER;

pub type ApiResult<T> = Result<T, Problem>;

/// Map a resolution rejection to RFC 9457 Problem.
///
/// Details are generic; the internal cause is only logged.
pub fn resolution_error_to_problem(
    e: &ResolutionError,
    instance: &str,
    trace_id: Option<String>,
) -> Problem {
    let problem = match e {
        ResolutionError::HeaderMissing => {
            errors::TENANT_HEADER_MISSING.as_problem("A tenant identifier is required")
        }
        ResolutionError::NotFound => {
            errors::TENANT_NOT_FOUND.as_problem("The requested tenant does not exist")
        }
        ResolutionError::CrossTenantAccess => errors::CROSS_TENANT_ACCESS
            .as_problem("Access to the requested tenant is not allowed"),
        ResolutionError::Internal(_) => {
            errors::TENANT_RESOLUTION_ERROR.as_problem("The tenant could not be resolved")
        }
    };
    finalize(problem, instance, trace_id)
}

/// Map a lifecycle error to RFC 9457 Problem.
pub fn domain_error_to_problem(e: &DomainError, instance: &str, trace_id: Option<String>) -> Problem {
    let problem = match e {
        DomainError::NotFound { .. } => errors::TENANT_NOT_FOUND.as_problem("Tenant not found"),
        DomainError::SlugTaken { .. } => {
            errors::TENANT_SLUG_TAKEN.as_problem("The slug is already taken")
        }
        DomainError::InvalidSlug { reason, .. } => errors::TENANT_SLUG_INVALID
            .as_problem("The tenant slug is not acceptable")
            .with_errors(vec![ValidationViolation {
                field: "slug".to_owned(),
                message: reason.message().to_owned(),
                code: None,
            }]),
        DomainError::Validation { field, message } => errors::TENANT_VALIDATION
            .as_problem(format!("Validation error on '{field}'"))
            .with_errors(vec![ValidationViolation {
                field: field.clone(),
                message: message.clone(),
                code: None,
            }]),
        DomainError::Directory(_) => {
            tracing::error!(error = ?e, "tenant directory failure");
            errors::TENANT_DIRECTORY_ERROR.as_problem("An internal error occurred")
        }
    };
    finalize(problem, instance, trace_id)
}

impl From<DomainError> for Problem {
    fn from(e: DomainError) -> Self {
        domain_error_to_problem(&e, "/", None)
    }
}

/// Request path and correlation id used to finalize problems in handlers.
#[derive(Debug, Clone, Default)]
pub struct ProblemScope {
    pub instance: String,
    pub trace_id: Option<String>,
}

impl ProblemScope {
    pub fn domain(&self, e: &DomainError) -> Problem {
        domain_error_to_problem(e, &self.instance, self.trace_id.clone())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ProblemScope {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let trace_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.trim().is_empty())
            .map(ToOwned::to_owned);
        Ok(Self {
            instance: parts.uri.path().to_owned(),
            trace_id,
        })
    }
}
