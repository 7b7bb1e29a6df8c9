use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The kind of a workflow node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
  /// The single entry node of a workflow.
  Start,
  /// A step with at most one successor.
  Action,
  /// A condition with a `true` and a `false` outgoing slot.
  Branch,
  /// A terminal node.
  End,
}

impl NodeKind {
  /// Label given to freshly created nodes of this kind.
  pub fn default_label(self) -> &'static str {
    match self {
      NodeKind::Action => "New Action",
      NodeKind::Branch => "New Condition",
      NodeKind::End => "End",
      NodeKind::Start => "Node",
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      NodeKind::Start => "start",
      NodeKind::Action => "action",
      NodeKind::Branch => "branch",
      NodeKind::End => "end",
    }
  }
}

impl fmt::Display for NodeKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for NodeKind {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "start" => Ok(NodeKind::Start),
      "action" => Ok(NodeKind::Action),
      "branch" => Ok(NodeKind::Branch),
      "end" => Ok(NodeKind::End),
      other => Err(ConfigError::UnknownNodeKind(other.to_string())),
    }
  }
}

/// One of the two named outgoing slots of a branch node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BranchSlot {
  #[serde(rename = "true")]
  True,
  #[serde(rename = "false")]
  False,
}

impl BranchSlot {
  /// Both slots, in display order.
  pub const ALL: [BranchSlot; 2] = [BranchSlot::True, BranchSlot::False];

  pub fn as_str(self) -> &'static str {
    match self {
      BranchSlot::True => "true",
      BranchSlot::False => "false",
    }
  }
}

impl fmt::Display for BranchSlot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for BranchSlot {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "true" => Ok(BranchSlot::True),
      "false" => Ok(BranchSlot::False),
      other => Err(ConfigError::UnknownBranchSlot(other.to_string())),
    }
  }
}

/// What happens when a node is added to a branch slot that already holds a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotPolicy {
  /// Replace the existing child. Its subtree is left unreferenced.
  Overwrite,
  /// Refuse the add.
  #[default]
  Reject,
}
