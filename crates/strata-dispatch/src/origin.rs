//! Origin handlers and the registry binding them to operation names.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use strata_core::Value;

use crate::error::OriginError;

/// What an origin handler produces: a value, "no data" (`None`), or an error.
pub type OriginResult = Result<Option<Value>, OriginError>;

/// The computation behind an operation, run only on a full cache and
/// storage miss.
///
/// # Example
///
/// ```ignore
/// struct ListUsers { client: ApiClient }
///
/// #[async_trait]
/// impl OriginHandler for ListUsers {
///     async fn call(&self, args: &[Value]) -> OriginResult {
///         let users = self.client.list_users().await.map_err(|e| OriginError::new(e.to_string()))?;
///         Ok(Some(users.into()))
///     }
/// }
/// ```
#[async_trait]
pub trait OriginHandler: Send + Sync {
    /// Runs the computation with the call's original arguments.
    async fn call(&self, args: &[Value]) -> OriginResult;
}

/// Adapts an async closure into an [`OriginHandler`].
pub struct FnHandler<F>(F);

impl<F> FnHandler<F> {
    /// Wraps a closure.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F, Fut> OriginHandler for FnHandler<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = OriginResult> + Send + 'static,
{
    async fn call(&self, args: &[Value]) -> OriginResult {
        (self.0)(args.to_vec()).await
    }
}

/// Explicit mapping from operation name to handler.
///
/// # Example
///
/// ```
/// use strata_core::Value;
/// use strata_dispatch::OriginRegistry;
///
/// let registry = OriginRegistry::new()
///     .with_fn("listUsers", |_args| async { Ok(Some(Value::from(vec!["alice", "bob"]))) });
///
/// assert!(registry.contains("listUsers"));
/// assert!(!registry.contains("deleteUser"));
/// ```
#[derive(Clone, Default)]
pub struct OriginRegistry {
    handlers: HashMap<String, Arc<dyn OriginHandler>>,
}

impl OriginRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a handler to an operation, replacing any previous one.
    pub fn register(&mut self, operation: impl Into<String>, handler: impl OriginHandler + 'static) {
        self.handlers.insert(operation.into(), Arc::new(handler));
    }

    /// Binds an async closure to an operation.
    pub fn register_fn<F, Fut>(&mut self, operation: impl Into<String>, f: F)
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = OriginResult> + Send + 'static,
    {
        self.register(operation, FnHandler::new(f));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_handler(mut self, operation: impl Into<String>, handler: impl OriginHandler + 'static) -> Self {
        self.register(operation, handler);
        self
    }

    /// Builder form of [`register_fn`](Self::register_fn).
    pub fn with_fn<F, Fut>(mut self, operation: impl Into<String>, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = OriginResult> + Send + 'static,
    {
        self.register_fn(operation, f);
        self
    }

    /// Looks up the handler for an operation.
    pub fn get(&self, operation: &str) -> Option<Arc<dyn OriginHandler>> {
        self.handlers.get(operation).cloned()
    }

    /// Returns true if a handler is bound to the operation.
    pub fn contains(&self, operation: &str) -> bool {
        self.handlers.contains_key(operation)
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for OriginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("OriginRegistry").field("operations", &names).finish()
    }
}
