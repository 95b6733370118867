use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use volley_core::{ItemId, OperationError};

pub type OperationFuture<T> = BoxFuture<'static, Result<T, OperationError>>;

type OperationFn<T> = dyn Fn() -> OperationFuture<T> + Send + Sync;

/// One unit of remote work. The operation is re-invocable so a retry round
/// can drive it again; the engine never mutates an item.
pub struct WorkItem<T> {
    id: ItemId,
    operation: Arc<OperationFn<T>>,
}

impl<T> Clone for WorkItem<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            operation: Arc::clone(&self.operation),
        }
    }
}

impl<T> std::fmt::Debug for WorkItem<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkItem").field("id", &self.id).finish_non_exhaustive()
    }
}

impl<T: Send + 'static> WorkItem<T> {
    pub fn new<F, Fut, E>(id: impl Into<ItemId>, operation: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<OperationError>,
    {
        let operation: Arc<OperationFn<T>> = Arc::new(move || {
            let fut = operation();
            async move { fut.await.map_err(Into::into) }.boxed()
        });
        Self {
            id: id.into(),
            operation,
        }
    }
}

impl<T> WorkItem<T> {
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// Start one attempt.
    pub fn invoke(&self) -> OperationFuture<T> {
        (self.operation)()
    }
}
