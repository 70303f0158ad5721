//! Problem body returned by every tenancy endpoint (RFC 9457).
//!
//! Tenant resolution failures, cross-tenant rejections and admin lifecycle
//! errors all leave the service as a [`Problem`]. The body carries the
//! stable catalog `code` and the request's correlation id, never the
//! identity of a tenant other than the caller's.

use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Media type set on every problem response.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// Status codes travel as bare numbers (`"status": 404`).
mod status_as_u16 {
    use http::StatusCode;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)] // signature fixed by `serde(with)`
    pub fn serialize<S: Serializer>(status: &StatusCode, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u16(status.as_u16())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<StatusCode, D::Error> {
        StatusCode::from_u16(u16::deserialize(d)?).map_err(serde::de::Error::custom)
    }
}

/// Error body of the tenancy API.
///
/// `detail` is read by the calling tenant. It may name the caller's own
/// slug but nothing resolved for somebody else: no foreign tenant ids, no
/// SQL text, no subscription data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[must_use]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_url: String,
    pub title: String,
    #[serde(with = "status_as_u16")]
    pub status: StatusCode,
    pub detail: String,
    /// Request path that failed, filled in by `finalize`.
    pub instance: String,
    /// Catalog code, e.g. `TENANT_INACTIVE`.
    pub code: String,
    pub trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationViolation>>,
}

/// One rejected input field, used by tenant registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationViolation {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Problem {
    /// Untyped problem; catalog entries go through `ErrDef::as_problem`.
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_owned(),
            title: title.into(),
            status,
            detail: detail.into(),
            instance: String::new(),
            code: String::new(),
            trace_id: None,
            errors: None,
        }
    }

    pub fn with_type(mut self, type_url: impl Into<String>) -> Self {
        self.type_url = type_url.into();
        self
    }

    pub fn with_instance(mut self, path: impl Into<String>) -> Self {
        self.instance = path.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_trace_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.trace_id = Some(correlation_id.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<ValidationViolation>) -> Self {
        self.errors = Some(errors);
        self
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for Problem {
    fn into_response(self) -> axum::response::Response {
        let status = self.status;
        let mut resp = axum::Json(self).into_response();
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        resp
    }
}
