use branchwork_config::BranchSlot;
use thiserror::Error;

use crate::validate::IntegrityIssue;

/// Reasons a single workflow operation is rejected.
///
/// A rejection never changes the workflow: the previous snapshot stays current.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
  #[error("parent node not found: {0}")]
  ParentNotFound(String),

  #[error("node not found: {0}")]
  NodeNotFound(String),

  #[error("end node '{parent_id}' cannot have any children")]
  TerminalNodeChildrenForbidden { parent_id: String },

  #[error("action node '{parent_id}' can have only one child")]
  ActionNodeSingleChildViolation { parent_id: String },

  #[error("branch node '{parent_id}' requires adding to a specific slot (true/false)")]
  BranchSlotRequired { parent_id: String },

  #[error("branch node '{parent_id}' already has '{occupant}' in its {slot} slot")]
  SlotOccupied {
    parent_id: String,
    slot: BranchSlot,
    occupant: String,
  },

  #[error("a workflow has exactly one start node; another cannot be added")]
  StartNodeForbidden,

  #[error("duplicate node id: {0}")]
  DuplicateNodeId(String),

  #[error("start node '{node_id}' cannot be deleted")]
  RootDeletionForbidden { node_id: String },

  /// The workflow failed integrity validation.
  #[error("workflow validation failed: {0}")]
  Invalid(#[from] IntegrityIssue),
}
