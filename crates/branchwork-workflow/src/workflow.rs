use std::collections::BTreeMap;

use branchwork_config::{NodeKind, StoreConfig};
use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::node::Node;

/// One immutable version of a workflow tree.
///
/// Nodes are kept in id order, so a stored workflow serializes the same way every
/// time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
  pub nodes: BTreeMap<String, Node>,
  pub root_id: String,
}

impl Workflow {
  /// The initial workflow: a single start node with no children.
  pub fn new(config: &StoreConfig) -> Self {
    let root = Node::new(config.root_id.clone(), NodeKind::Start, config.root_label.clone());
    let mut nodes = BTreeMap::new();
    nodes.insert(root.id.clone(), root);

    Self {
      nodes,
      root_id: config.root_id.clone(),
    }
  }

  /// Build the reference graph for traversal.
  pub fn graph(&self) -> Graph {
    Graph::new(self)
  }

  /// Get a node by ID.
  pub fn get_node(&self, node_id: &str) -> Option<&Node> {
    self.nodes.get(node_id)
  }

  pub fn root(&self) -> Option<&Node> {
    self.nodes.get(&self.root_id)
  }

  pub fn contains(&self, node_id: &str) -> bool {
    self.nodes.contains_key(node_id)
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  pub fn has_kind(&self, kind: NodeKind) -> bool {
    self.nodes.values().any(|node| node.kind() == kind)
  }

  /// Node ids in sorted order, for deterministic reporting.
  pub fn sorted_ids(&self) -> Vec<&str> {
    self.nodes.keys().map(String::as_str).collect()
  }
}

impl Default for Workflow {
  fn default() -> Self {
    Self::new(&StoreConfig::default())
  }
}
