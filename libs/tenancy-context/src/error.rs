/// Errors raised by the context carrier.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// The supplied context has neither a tenant id nor a slug.
    #[error("invalid tenant context: a tenant id or slug is required")]
    InvalidContext,

    /// `set` was called outside of any tenant scope.
    #[error("no active tenant scope in the current task")]
    NoActiveScope,

    /// The task-local propagation primitive cannot be used (no tokio runtime).
    #[error("tenant context propagation unavailable: {0}")]
    PropagationUnavailable(String),
}
