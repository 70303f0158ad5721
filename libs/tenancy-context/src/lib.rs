//! Tenant context carrier.
//!
//! Makes the resolved tenant identity available anywhere inside the async call
//! graph of one operation without threading it through every function
//! signature. The context is bound to the tokio task that runs the scope, not
//! to an OS thread, so operations of different tenants interleaving on the same
//! worker threads never observe each other's identity.
//!
//! ```ignore
//! use tenancy_context::{TenantContext, run_with, current};
//!
//! let ctx = TenantContext::builder()
//!     .tenant_id(tenant_id)
//!     .slug("cafe-kopi")
//!     .name("Cafe Kopi")
//!     .build();
//!
//! run_with(ctx, async {
//!     // anywhere below, including after awaits and inside `join!`
//!     let active = current().expect("inside a tenant scope");
//! })
//! .await?;
//! ```
//!
//! Tasks created with `tokio::spawn` do not inherit task-locals; use
//! [`spawn`] to carry the active context into a new task.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod carrier;
pub mod context;
pub mod error;

pub use carrier::{
    current, ensure_propagation_available, is_active, run_with, set, spawn, try_current,
};
pub use context::{TenantContext, TenantContextBuilder};
pub use error::ContextError;
