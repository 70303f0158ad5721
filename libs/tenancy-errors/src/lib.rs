//! Error payloads shared by the tenancy crates.
//!
//! - RFC 9457 Problem Details (`Problem`) used for every rejected request
//! - Static error catalog entries (`ErrDef`) with stable machine-readable codes
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod catalog;
pub mod problem;

pub use catalog::ErrDef;
pub use problem::{APPLICATION_PROBLEM_JSON, Problem, ValidationViolation};

/// Attach the request path and correlation id to a Problem.
pub fn finalize(mut p: Problem, instance: &str, trace_id: Option<String>) -> Problem {
    p = p.with_instance(instance);
    if let Some(tid) = trace_id {
        p = p.with_trace_id(tid);
    }
    p
}
