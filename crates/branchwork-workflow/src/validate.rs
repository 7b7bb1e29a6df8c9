//! Workflow integrity validation.
//!
//! Rules run in a fixed order and stop at the first failure:
//! 1. the root id resolves to a node
//! 2. no orphaned nodes (flat reference check, see [`Graph::is_referenced`])
//! 3. end nodes point nowhere, action nodes have at most one child
//! 4. the root is the only start node
//! 5. no references to missing nodes
//! 6. no cycles
//!
//! [`Graph::is_referenced`]: crate::Graph::is_referenced

use branchwork_config::NodeKind;
use thiserror::Error;
use tracing::debug;

use crate::workflow::Workflow;

/// The first rule a workflow violates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityIssue {
  #[error("root node '{root_id}' not found")]
  MissingRoot { root_id: String },

  #[error("orphaned nodes found: {}", .node_ids.join(", "))]
  OrphanedNodes { node_ids: Vec<String> },

  #[error("end node '{node_id}' has children")]
  TerminalHasChildren { node_id: String },

  #[error("action node '{node_id}' has multiple children ({count})")]
  ActionHasMultipleChildren { node_id: String, count: usize },

  #[error("root node '{node_id}' is a {kind} node, not a start node")]
  RootNotStart { node_id: String, kind: NodeKind },

  #[error("multiple start nodes found: {}", .node_ids.join(", "))]
  MultipleStartNodes { node_ids: Vec<String> },

  #[error("node '{from}' references missing node '{to}'")]
  DanglingReference { from: String, to: String },

  #[error("cycle detected through node '{node_id}'")]
  Cycle { node_id: String },
}

/// Outcome of [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
  pub valid: bool,
  pub issue: Option<IntegrityIssue>,
}

impl Validation {
  fn passed() -> Self {
    Self {
      valid: true,
      issue: None,
    }
  }

  fn failed(issue: IntegrityIssue) -> Self {
    Self {
      valid: false,
      issue: Some(issue),
    }
  }

  /// Human-readable reason, present only when invalid.
  pub fn reason(&self) -> Option<String> {
    self.issue.as_ref().map(ToString::to_string)
  }

  /// Convert into a `Result`, for callers that want `?`.
  pub fn into_result(self) -> Result<(), IntegrityIssue> {
    match self.issue {
      Some(issue) => Err(issue),
      None => Ok(()),
    }
  }
}

/// Check a workflow snapshot for structural corruption.
pub fn validate(workflow: &Workflow) -> Validation {
  match find_issue(workflow) {
    Some(issue) => {
      debug!(issue = %issue, "workflow failed validation");
      Validation::failed(issue)
    }
    None => Validation::passed(),
  }
}

fn find_issue(workflow: &Workflow) -> Option<IntegrityIssue> {
  let Some(root) = workflow.root() else {
    return Some(IntegrityIssue::MissingRoot {
      root_id: workflow.root_id.clone(),
    });
  };

  let graph = workflow.graph();

  let orphans = graph.unreferenced(workflow);
  if !orphans.is_empty() {
    return Some(IntegrityIssue::OrphanedNodes {
      node_ids: orphans.into_iter().map(String::from).collect(),
    });
  }

  for node_id in workflow.sorted_ids() {
    let Some(node) = workflow.get_node(node_id) else {
      continue;
    };
    match node.kind() {
      NodeKind::End if node.targets().next().is_some() => {
        return Some(IntegrityIssue::TerminalHasChildren {
          node_id: node_id.to_string(),
        });
      }
      NodeKind::Action if node.children().len() > 1 => {
        return Some(IntegrityIssue::ActionHasMultipleChildren {
          node_id: node_id.to_string(),
          count: node.children().len(),
        });
      }
      _ => {}
    }
  }

  if root.kind() != NodeKind::Start {
    return Some(IntegrityIssue::RootNotStart {
      node_id: root.id.clone(),
      kind: root.kind(),
    });
  }

  let starts: Vec<String> = workflow
    .sorted_ids()
    .into_iter()
    .filter(|id| {
      workflow
        .get_node(id)
        .is_some_and(|node| node.kind() == NodeKind::Start)
    })
    .map(String::from)
    .collect();
  if starts.len() > 1 {
    return Some(IntegrityIssue::MultipleStartNodes { node_ids: starts });
  }

  if let Some((from, to)) = graph.dangling(workflow).first() {
    return Some(IntegrityIssue::DanglingReference {
      from: from.to_string(),
      to: to.to_string(),
    });
  }

  graph.find_cycle().map(|node_id| IntegrityIssue::Cycle {
    node_id: node_id.to_string(),
  })
}
