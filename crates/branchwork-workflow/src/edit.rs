//! Structural edits.
//!
//! Every edit borrows the current snapshot and returns a new one. Checks run before
//! anything is cloned, so a rejected edit has no effect.

use branchwork_config::{BranchSlot, NodeKind, SlotPolicy};

use crate::error::WorkflowError;
use crate::node::{Node, NodeBody};
use crate::workflow::Workflow;

/// Where a new node is attached under its parent.
///
/// `slot` is required for branch parents and ignored for others. `position` indexes
/// into the parent's children sequence; absent means 0 and anything past the end
/// appends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Placement {
  pub slot: Option<BranchSlot>,
  pub position: Option<usize>,
}

impl Placement {
  pub fn slot(slot: BranchSlot) -> Self {
    Self {
      slot: Some(slot),
      position: None,
    }
  }

  pub fn at(position: usize) -> Self {
    Self {
      slot: None,
      position: Some(position),
    }
  }
}

impl Workflow {
  /// Attach a fresh node of `kind` under `parent_id`.
  ///
  /// Only the parent and the new node differ between `self` and the result.
  pub fn insert_node(
    &self,
    parent_id: &str,
    node: Node,
    placement: Placement,
    policy: SlotPolicy,
  ) -> Result<Workflow, WorkflowError> {
    let parent = self
      .get_node(parent_id)
      .ok_or_else(|| WorkflowError::ParentNotFound(parent_id.to_string()))?;

    match &parent.body {
      NodeBody::End { .. } => {
        return Err(WorkflowError::TerminalNodeChildrenForbidden {
          parent_id: parent_id.to_string(),
        });
      }
      // A slot does not help here: action nodes have no slots.
      NodeBody::Action { children } if !children.is_empty() => {
        return Err(WorkflowError::ActionNodeSingleChildViolation {
          parent_id: parent_id.to_string(),
        });
      }
      NodeBody::Branch { .. } if placement.slot.is_none() => {
        return Err(WorkflowError::BranchSlotRequired {
          parent_id: parent_id.to_string(),
        });
      }
      _ => {}
    }

    if node.kind() == NodeKind::Start {
      return Err(WorkflowError::StartNodeForbidden);
    }
    if self.contains(&node.id) {
      return Err(WorkflowError::DuplicateNodeId(node.id));
    }

    if let (Some(branches), Some(slot)) = (parent.branches(), placement.slot) {
      if let Some(occupant) = branches.get(slot) {
        if policy == SlotPolicy::Reject {
          return Err(WorkflowError::SlotOccupied {
            parent_id: parent_id.to_string(),
            slot,
            occupant: occupant.to_string(),
          });
        }
      }
    }

    let mut parent = parent.clone();
    let node_id = node.id.clone();

    if let (Some(branches), Some(slot)) = (parent.branches_mut(), placement.slot) {
      branches.set(slot, Some(node_id));
    } else if let Some(children) = parent.children_mut() {
      let index = placement.position.unwrap_or(0).min(children.len());
      children.insert(index, node_id);
    }

    let mut next = self.clone();
    next.nodes.insert(parent.id.clone(), parent);
    next.nodes.insert(node.id.clone(), node);
    Ok(next)
  }

  /// Remove `node_id` and reconnect every node that pointed at it.
  ///
  /// Start and action parents get the removed node's children spliced in at its
  /// position. Branch parents get its first child in the referencing slot, or an
  /// empty slot; any further children are left unreferenced. Removing an unknown
  /// id returns an unchanged copy.
  pub fn remove_node(&self, node_id: &str) -> Result<Workflow, WorkflowError> {
    if node_id == self.root_id {
      return Err(WorkflowError::RootDeletionForbidden {
        node_id: node_id.to_string(),
      });
    }

    let Some(removed) = self.get_node(node_id) else {
      return Ok(self.clone());
    };

    let graph = self.graph();
    let mut next = self.clone();

    for parent_id in graph.upstream(node_id) {
      let Some(parent) = next.nodes.get_mut(parent_id) else {
        continue;
      };

      if let Some(branches) = parent.branches_mut() {
        let replacement = removed.children().first().cloned();
        for slot in branches.slots_referencing(node_id) {
          branches.set(slot, replacement.clone());
        }
      } else if let Some(children) = parent.children_mut() {
        if let Some(index) = children.iter().position(|c| c == node_id) {
          children.splice(index..=index, removed.children().iter().cloned());
        }
      }
    }

    next.nodes.remove(node_id);
    Ok(next)
  }

  /// Replace a node's label. The structure is unchanged.
  pub fn relabel_node(&self, node_id: &str, label: impl Into<String>) -> Result<Workflow, WorkflowError> {
    if !self.contains(node_id) {
      return Err(WorkflowError::NodeNotFound(node_id.to_string()));
    }

    let mut next = self.clone();
    if let Some(node) = next.nodes.get_mut(node_id) {
      node.label = label.into();
    }
    Ok(next)
  }
}
