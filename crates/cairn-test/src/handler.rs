//! A downstream handler that records what reaches it.

use async_trait::async_trait;
use cairn_core::{CairnError, CairnResult, Operation, OperationHandler, OperationOutcome};
use parking_lot::Mutex;

/// Captures every operation it is asked to handle.
///
/// Answers with `Modified([target])` unless built with [`failing`](Self::failing).
#[derive(Debug, Default)]
pub struct RecordingHandler {
    operations: Mutex<Vec<Operation>>,
    failure: Option<fn() -> CairnError>,
}

impl RecordingHandler {
    /// A handler that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A handler that records, then fails with whatever `error` builds.
    #[must_use]
    pub fn failing(error: fn() -> CairnError) -> Self {
        Self {
            operations: Mutex::new(Vec::new()),
            failure: Some(error),
        }
    }

    /// Operations handled so far.
    #[must_use]
    pub fn operations(&self) -> Vec<Operation> {
        self.operations.lock().clone()
    }

    /// Whether anything reached this handler.
    #[must_use]
    pub fn was_called(&self) -> bool {
        !self.operations.lock().is_empty()
    }
}

#[async_trait]
impl OperationHandler for RecordingHandler {
    async fn handle(&self, operation: Operation) -> CairnResult<OperationOutcome> {
        let target = operation.target.clone();
        self.operations.lock().push(operation);
        match self.failure {
            Some(error) => Err(error()),
            None => Ok(OperationOutcome::Modified(vec![target])),
        }
    }
}
