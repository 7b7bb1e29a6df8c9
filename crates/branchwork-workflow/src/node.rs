use branchwork_config::{BranchSlot, NodeKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single node of a workflow tree.
///
/// Deserialization checks the stored fields against the node's type: slots on a
/// non-branch node or children on a branch node are an error, never dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNode")]
pub struct Node {
  pub id: String,
  pub label: String,
  #[serde(flatten)]
  pub body: NodeBody,
}

/// Kind-specific shape of a node.
///
/// Start and action nodes hold an ordered children sequence, branch nodes hold
/// two named slots. End nodes never gain children through edits; children read
/// from a stored workflow are kept so validation can report them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeBody {
  Start {
    #[serde(default)]
    children: Vec<String>,
  },
  Action {
    /// At most one entry.
    #[serde(default)]
    children: Vec<String>,
  },
  Branch {
    #[serde(default)]
    branches: Branches,
  },
  End {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<String>,
  },
}

/// A stored node before its fields are checked against its kind.
#[derive(Debug, Deserialize)]
struct RawNode {
  id: String,
  label: String,
  #[serde(rename = "type")]
  kind: NodeKind,
  #[serde(default)]
  children: Option<Vec<String>>,
  #[serde(default)]
  branches: Option<Branches>,
}

/// A stored node whose fields do not match its kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeShapeError {
  #[error("{kind} node '{node_id}' cannot have branch slots")]
  UnexpectedBranches { node_id: String, kind: NodeKind },

  #[error("branch node '{node_id}' cannot have children, only true/false slots")]
  UnexpectedChildren { node_id: String },
}

impl TryFrom<RawNode> for Node {
  type Error = NodeShapeError;

  fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
    let children = raw.children.unwrap_or_default();
    let branches = raw.branches.unwrap_or_default();

    if raw.kind != NodeKind::Branch && branches.targets().next().is_some() {
      return Err(NodeShapeError::UnexpectedBranches {
        node_id: raw.id,
        kind: raw.kind,
      });
    }

    let body = match raw.kind {
      NodeKind::Start => NodeBody::Start { children },
      NodeKind::Action => NodeBody::Action { children },
      NodeKind::End => NodeBody::End { children },
      NodeKind::Branch if !children.is_empty() => {
        return Err(NodeShapeError::UnexpectedChildren { node_id: raw.id });
      }
      NodeKind::Branch => NodeBody::Branch { branches },
    };

    Ok(Self {
      id: raw.id,
      label: raw.label,
      body,
    })
  }
}

/// The `true` and `false` outgoing slots of a branch node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branches {
  #[serde(rename = "true", default)]
  pub on_true: Option<String>,
  #[serde(rename = "false", default)]
  pub on_false: Option<String>,
}

impl Branches {
  pub fn get(&self, slot: BranchSlot) -> Option<&str> {
    match slot {
      BranchSlot::True => self.on_true.as_deref(),
      BranchSlot::False => self.on_false.as_deref(),
    }
  }

  pub fn set(&mut self, slot: BranchSlot, target: Option<String>) {
    match slot {
      BranchSlot::True => self.on_true = target,
      BranchSlot::False => self.on_false = target,
    }
  }

  /// Non-empty slot targets, `true` first.
  pub fn targets(&self) -> impl Iterator<Item = &str> {
    BranchSlot::ALL.into_iter().filter_map(|slot| self.get(slot))
  }

  /// Slots currently pointing at `node_id`.
  pub fn slots_referencing(&self, node_id: &str) -> Vec<BranchSlot> {
    BranchSlot::ALL
      .into_iter()
      .filter(|slot| self.get(*slot) == Some(node_id))
      .collect()
  }
}

impl Node {
  /// Create a detached node of `kind` with empty children or empty slots.
  pub fn new(id: impl Into<String>, kind: NodeKind, label: impl Into<String>) -> Self {
    let body = match kind {
      NodeKind::Start => NodeBody::Start {
        children: Vec::new(),
      },
      NodeKind::Action => NodeBody::Action {
        children: Vec::new(),
      },
      NodeKind::Branch => NodeBody::Branch {
        branches: Branches::default(),
      },
      NodeKind::End => NodeBody::End {
        children: Vec::new(),
      },
    };

    Self {
      id: id.into(),
      label: label.into(),
      body,
    }
  }

  pub fn kind(&self) -> NodeKind {
    match self.body {
      NodeBody::Start { .. } => NodeKind::Start,
      NodeBody::Action { .. } => NodeKind::Action,
      NodeBody::Branch { .. } => NodeKind::Branch,
      NodeBody::End { .. } => NodeKind::End,
    }
  }

  /// The ordered children sequence. Empty for branch nodes, and for end nodes
  /// unless a stored workflow gave them children.
  pub fn children(&self) -> &[String] {
    match &self.body {
      NodeBody::Start { children }
      | NodeBody::Action { children }
      | NodeBody::End { children } => children,
      NodeBody::Branch { .. } => &[],
    }
  }

  pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<String>> {
    match &mut self.body {
      NodeBody::Start { children } | NodeBody::Action { children } => Some(children),
      NodeBody::Branch { .. } | NodeBody::End { .. } => None,
    }
  }

  pub fn branches(&self) -> Option<&Branches> {
    match &self.body {
      NodeBody::Branch { branches } => Some(branches),
      _ => None,
    }
  }

  pub(crate) fn branches_mut(&mut self) -> Option<&mut Branches> {
    match &mut self.body {
      NodeBody::Branch { branches } => Some(branches),
      _ => None,
    }
  }

  /// Every node id this node points at: children first, then non-empty slots.
  pub fn targets(&self) -> impl Iterator<Item = &str> {
    self
      .children()
      .iter()
      .map(String::as_str)
      .chain(self.branches().into_iter().flat_map(Branches::targets))
  }
}
