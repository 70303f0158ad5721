//! Task-local storage for the active [`TenantContext`].

use std::cell::RefCell;
use std::future::Future;

use tokio::task::JoinHandle;

use crate::context::TenantContext;
use crate::error::ContextError;

// One slot per scope. Nested `run_with` calls shadow the outer slot and the
// outer value becomes visible again once the inner future completes.
tokio::task_local! {
    static TENANT_SCOPE: RefCell<Option<TenantContext>>;
}

/// Run `fut` with `ctx` as the active tenant context.
///
/// Everything `fut` awaits, joins or selects observes `ctx`. Timers and
/// error paths do not drop it.
///
/// # Errors
/// Returns [`ContextError::InvalidContext`] without polling `fut` when `ctx`
/// carries neither a tenant id nor a slug.
pub async fn run_with<F>(ctx: TenantContext, fut: F) -> Result<F::Output, ContextError>
where
    F: Future,
{
    if !ctx.is_valid() {
        tracing::warn!(
            category = "tenant_context",
            event = "context.invalid",
            "refusing to open a tenant scope with an empty context"
        );
        return Err(ContextError::InvalidContext);
    }

    tracing::trace!(
        category = "tenant_context",
        event = "context.enter",
        tenant_id = %ctx.tenant_id(),
        tenant_slug = %ctx.slug(),
        "entering tenant scope"
    );

    Ok(TENANT_SCOPE.scope(RefCell::new(Some(ctx)), fut).await)
}

/// Replace the context for the remainder of the current scope.
///
/// # Errors
/// [`ContextError::InvalidContext`] for an empty context,
/// [`ContextError::NoActiveScope`] when called outside [`run_with`].
pub fn set(ctx: TenantContext) -> Result<(), ContextError> {
    if !ctx.is_valid() {
        return Err(ContextError::InvalidContext);
    }

    TENANT_SCOPE
        .try_with(|slot| {
            *slot.borrow_mut() = Some(ctx);
        })
        .map_err(|_| ContextError::NoActiveScope)
}

/// The active context, or `None` without logging.
#[must_use]
pub fn try_current() -> Option<TenantContext> {
    TENANT_SCOPE
        .try_with(|slot| slot.borrow().clone())
        .ok()
        .flatten()
}

/// The active context.
///
/// A missing context is logged as an audit warning: callers reaching this
/// point without a scope are either trusted jobs that forgot to install one or
/// a code path that bypassed the resolver.
#[must_use]
pub fn current() -> Option<TenantContext> {
    let ctx = try_current();
    if ctx.is_none() {
        tracing::warn!(
            category = "tenant_context",
            event = "context.absent",
            "tenant context requested outside of a tenant scope"
        );
    }
    ctx
}

/// Whether a context is active in the current task.
#[must_use]
pub fn is_active() -> bool {
    TENANT_SCOPE
        .try_with(|slot| slot.borrow().is_some())
        .unwrap_or(false)
}

/// Spawn a task that inherits the active context.
///
/// Outside a scope this behaves like `tokio::spawn`.
pub fn spawn<F>(fut: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    match try_current() {
        Some(ctx) => tokio::spawn(TENANT_SCOPE.scope(RefCell::new(Some(ctx)), fut)),
        None => tokio::spawn(fut),
    }
}

/// Check that task-local propagation can work in this process.
///
/// Must be called from inside the runtime that will serve requests; there is
/// no process-wide fallback slot.
///
/// # Errors
/// [`ContextError::PropagationUnavailable`] when no tokio runtime is running.
pub fn ensure_propagation_available() -> Result<(), ContextError> {
    tokio::runtime::Handle::try_current()
        .map(|_| ())
        .map_err(|e| ContextError::PropagationUnavailable(e.to_string()))
}
