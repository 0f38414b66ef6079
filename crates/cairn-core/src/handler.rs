//! Handler trait for operation processing.
//!
//! An [`OperationHandler`] executes an [`Operation`] whose credentials, modes
//! and permissions have already been resolved. The authorization pipeline
//! wraps one of these and only forwards operations it has approved.

use crate::{CairnResult, Operation, OperationOutcome};
use async_trait::async_trait;
use std::sync::Arc;

/// Executes authorized operations.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use cairn_core::{CairnResult, Operation, OperationHandler, OperationOutcome};
///
/// struct Echo;
///
/// #[async_trait]
/// impl OperationHandler for Echo {
///     async fn handle(&self, operation: Operation) -> CairnResult<OperationOutcome> {
///         Ok(OperationOutcome::Modified(vec![operation.target]))
///     }
/// }
/// ```
#[async_trait]
pub trait OperationHandler: Send + Sync {
    /// Handles an operation.
    ///
    /// # Errors
    ///
    /// Returns the store or validation error that prevented the operation.
    async fn handle(&self, operation: Operation) -> CairnResult<OperationOutcome>;
}

#[async_trait]
impl<T: OperationHandler + ?Sized> OperationHandler for Arc<T> {
    async fn handle(&self, operation: Operation) -> CairnResult<OperationOutcome> {
        (**self).handle(operation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CairnError;

    struct EchoHandler;

    #[async_trait]
    impl OperationHandler for EchoHandler {
        async fn handle(&self, operation: Operation) -> CairnResult<OperationOutcome> {
            Ok(OperationOutcome::Modified(vec![operation.target]))
        }
    }

    struct FailingHandler;

    #[async_trait]
    impl OperationHandler for FailingHandler {
        async fn handle(&self, _operation: Operation) -> CairnResult<OperationOutcome> {
            Err(CairnError::internal("Something went wrong"))
        }
    }

    #[tokio::test]
    async fn test_handler_impl() {
        let handler = EchoHandler;
        let outcome = handler.handle(Operation::delete("http://x/a")).await.unwrap();
        assert_eq!(outcome, OperationOutcome::Modified(vec!["http://x/a".into()]));
    }

    #[tokio::test]
    async fn test_arc_dyn_handler() {
        let handler: Arc<dyn OperationHandler> = Arc::new(FailingHandler);
        let result = handler.handle(Operation::read("http://x/a")).await;
        assert!(result.is_err());
    }
}
