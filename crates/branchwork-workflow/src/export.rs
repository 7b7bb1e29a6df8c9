use std::collections::BTreeMap;

use branchwork_config::NodeKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::depth::compute_depth;
use crate::node::Node;
use crate::workflow::Workflow;

/// A read-only export of a workflow snapshot with summary metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
  pub root_id: String,
  /// Nodes keyed by id, in id order.
  pub nodes: BTreeMap<String, Node>,
  pub metadata: ExportMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
  pub node_count: usize,
  pub max_depth: usize,
  pub has_branches: bool,
  pub has_end_nodes: bool,
  pub exported_at: DateTime<Utc>,
}

/// Export a snapshot, stamped with the current time.
pub fn export_snapshot(workflow: &Workflow) -> ExportRecord {
  export_snapshot_at(workflow, Utc::now())
}

/// Export a snapshot with an explicit timestamp.
pub fn export_snapshot_at(workflow: &Workflow, exported_at: DateTime<Utc>) -> ExportRecord {
  ExportRecord {
    root_id: workflow.root_id.clone(),
    nodes: workflow.nodes.clone(),
    metadata: ExportMetadata {
      node_count: workflow.len(),
      max_depth: compute_depth(workflow),
      has_branches: workflow.has_kind(NodeKind::Branch),
      has_end_nodes: workflow.has_kind(NodeKind::End),
      exported_at,
    },
  }
}

impl ExportRecord {
  /// Rebuild the workflow snapshot this record was taken from.
  pub fn to_workflow(&self) -> Workflow {
    Workflow {
      nodes: self.nodes.clone(),
      root_id: self.root_id.clone(),
    }
  }
}
