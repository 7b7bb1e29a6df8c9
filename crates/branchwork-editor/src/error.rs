use branchwork_workflow::WorkflowError;
use thiserror::Error;

/// Errors returned to editor handles.
#[derive(Debug, Error)]
pub enum EditorError {
  /// The editor task has stopped.
  #[error("workflow editor is not running")]
  Closed,

  /// The store rejected the operation.
  #[error(transparent)]
  Workflow(#[from] WorkflowError),
}
