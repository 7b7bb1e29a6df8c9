//! The workflow store.
//!
//! `WorkflowStore` owns the canonical snapshot. Each successful edit builds a new
//! snapshot and swaps it in; readers holding an earlier `Arc<Workflow>` keep a
//! complete, unchanging view. The store has no internal locking: use one owner
//! (see the `branchwork-editor` crate) when several tasks need to edit.

use std::sync::Arc;

use branchwork_config::{NodeKind, StoreConfig};
use tracing::{debug, info, instrument, warn};

use crate::depth::compute_depth;
use crate::edit::Placement;
use crate::error::WorkflowError;
use crate::events::{NoopNotifier, StoreEvent, StoreNotifier};
use crate::export::{ExportRecord, export_snapshot};
use crate::node::Node;
use crate::validate::{Validation, validate};
use crate::workflow::Workflow;

/// Result of a successful add.
#[derive(Debug, Clone)]
pub struct Inserted {
  /// Id allocated for the new node.
  pub node_id: String,
  /// The snapshot containing it.
  pub workflow: Arc<Workflow>,
}

/// Owner of the current workflow snapshot.
///
/// Generic over `N: StoreNotifier`. Use `WorkflowStore::new()` for a store that
/// discards events, or `WorkflowStore::with_notifier()` to observe them.
pub struct WorkflowStore<N: StoreNotifier = NoopNotifier> {
  current: Arc<Workflow>,
  config: StoreConfig,
  notifier: N,
}

impl WorkflowStore<NoopNotifier> {
  /// Create a store holding the initial single-start workflow.
  pub fn new(config: StoreConfig) -> Self {
    Self::with_notifier(config, NoopNotifier)
  }

  /// Adopt an existing workflow as the current snapshot.
  ///
  /// The workflow is not validated; call [`WorkflowStore::validate`] to check it.
  pub fn from_snapshot(workflow: Workflow, config: StoreConfig) -> Self {
    Self::from_snapshot_with_notifier(workflow, config, NoopNotifier)
  }
}

impl<N: StoreNotifier> WorkflowStore<N> {
  pub fn with_notifier(config: StoreConfig, notifier: N) -> Self {
    let workflow = Workflow::new(&config);
    Self::from_snapshot_with_notifier(workflow, config, notifier)
  }

  pub fn from_snapshot_with_notifier(workflow: Workflow, config: StoreConfig, notifier: N) -> Self {
    Self {
      current: Arc::new(workflow),
      config,
      notifier,
    }
  }

  /// The current snapshot.
  pub fn snapshot(&self) -> Arc<Workflow> {
    Arc::clone(&self.current)
  }

  pub fn config(&self) -> &StoreConfig {
    &self.config
  }

  /// Create a node of `kind` under `parent_id`.
  ///
  /// The new node gets a fresh id and the default label for its kind.
  #[instrument(skip(self))]
  pub fn add_node(
    &mut self,
    parent_id: &str,
    kind: NodeKind,
    placement: Placement,
  ) -> Result<Inserted, WorkflowError> {
    let node_id = fresh_node_id();
    let node = Node::new(node_id.clone(), kind, kind.default_label());

    let next = self
      .current
      .insert_node(parent_id, node, placement, self.config.slot_policy)
      .inspect_err(|e| warn!(error = %e, "add rejected"))?;

    let workflow = self.replace(next);
    info!(node_id = %node_id, "node added");
    self.notifier.notify(StoreEvent::NodeAdded {
      node_id: node_id.clone(),
      parent_id: parent_id.to_string(),
      kind,
      slot: placement.slot,
    });

    Ok(Inserted { node_id, workflow })
  }

  /// Delete a node and reconnect its parents around it.
  ///
  /// Deleting an unknown id is not an error: the current snapshot is returned.
  #[instrument(skip(self))]
  pub fn delete_node(&mut self, node_id: &str) -> Result<Arc<Workflow>, WorkflowError> {
    if !self.current.contains(node_id) && node_id != self.current.root_id {
      debug!("node not present, nothing to delete");
      return Ok(self.snapshot());
    }

    let parent_ids = self.current.graph().upstream(node_id).to_vec();
    let next = self
      .current
      .remove_node(node_id)
      .inspect_err(|e| warn!(error = %e, "delete rejected"))?;

    let workflow = self.replace(next);
    info!(parents = ?parent_ids, "node deleted");
    self.notifier.notify(StoreEvent::NodeDeleted {
      node_id: node_id.to_string(),
      parent_ids,
    });

    Ok(workflow)
  }

  #[instrument(skip(self, label))]
  pub fn relabel_node(
    &mut self,
    node_id: &str,
    label: impl Into<String>,
  ) -> Result<Arc<Workflow>, WorkflowError> {
    let label = label.into();
    let next = self
      .current
      .relabel_node(node_id, label.clone())
      .inspect_err(|e| warn!(error = %e, "relabel rejected"))?;

    let workflow = self.replace(next);
    debug!(label = %label, "node relabeled");
    self.notifier.notify(StoreEvent::NodeRelabeled {
      node_id: node_id.to_string(),
      label,
    });

    Ok(workflow)
  }

  pub fn validate(&self) -> Validation {
    validate(&self.current)
  }

  pub fn depth(&self) -> usize {
    compute_depth(&self.current)
  }

  /// Export the current snapshot without validating it.
  pub fn export(&self) -> ExportRecord {
    export_snapshot(&self.current)
  }

  /// Validate, then export. An invalid workflow is not exported.
  #[instrument(skip(self))]
  pub fn save(&self) -> Result<ExportRecord, WorkflowError> {
    self
      .validate()
      .into_result()
      .inspect_err(|issue| warn!(issue = %issue, "refusing to export invalid workflow"))?;

    let record = self.export();
    info!(
      node_count = record.metadata.node_count,
      max_depth = record.metadata.max_depth,
      "workflow exported"
    );
    self.notifier.notify(StoreEvent::Exported {
      node_count: record.metadata.node_count,
      max_depth: record.metadata.max_depth,
    });
    Ok(record)
  }

  fn replace(&mut self, next: Workflow) -> Arc<Workflow> {
    self.current = Arc::new(next);
    self.snapshot()
  }
}

impl Default for WorkflowStore<NoopNotifier> {
  fn default() -> Self {
    Self::new(StoreConfig::default())
  }
}

fn fresh_node_id() -> String {
  format!("node_{}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ChannelNotifier;
  use branchwork_config::{BranchSlot, SlotPolicy};

  #[test]
  fn test_fresh_ids_are_unique() {
    let a = fresh_node_id();
    let b = fresh_node_id();
    assert!(a.starts_with("node_"));
    assert_ne!(a, b);
  }

  #[test]
  fn test_add_returns_new_snapshot() {
    let mut store = WorkflowStore::default();
    let before = store.snapshot();

    let inserted = store
      .add_node("start", NodeKind::Action, Placement::default())
      .unwrap();

    assert_eq!(before.len(), 1);
    assert_eq!(inserted.workflow.len(), 2);
    assert_eq!(
      inserted.workflow.get_node(&inserted.node_id).unwrap().label,
      "New Action"
    );
    assert!(Arc::ptr_eq(&inserted.workflow, &store.snapshot()));
  }

  #[test]
  fn test_rejected_add_keeps_snapshot() {
    let mut store = WorkflowStore::default();
    let before = store.snapshot();

    let result = store.add_node("missing", NodeKind::End, Placement::default());
    assert!(matches!(result, Err(WorkflowError::ParentNotFound(_))));
    assert!(Arc::ptr_eq(&before, &store.snapshot()));
  }

  #[test]
  fn test_delete_unknown_is_noop() {
    let mut store = WorkflowStore::default();
    let before = store.snapshot();
    let after = store.delete_node("ghost").unwrap();
    assert!(Arc::ptr_eq(&before, &after));
  }

  #[test]
  fn test_delete_root_rejected() {
    let mut store = WorkflowStore::default();
    let result = store.delete_node("start");
    assert!(matches!(
      result,
      Err(WorkflowError::RootDeletionForbidden { .. })
    ));
  }

  #[test]
  fn test_save_refuses_invalid_workflow() {
    let config = StoreConfig {
      slot_policy: SlotPolicy::Overwrite,
      ..StoreConfig::default()
    };
    let mut store = WorkflowStore::new(config);
    let branch = store
      .add_node("start", NodeKind::Branch, Placement::default())
      .unwrap();
    store
      .add_node(&branch.node_id, NodeKind::End, Placement::slot(BranchSlot::True))
      .unwrap();
    assert!(store.save().is_ok());

    // overwrite the occupied slot, orphaning the first end node
    store
      .add_node(&branch.node_id, NodeKind::End, Placement::slot(BranchSlot::True))
      .unwrap();
    assert!(matches!(store.save(), Err(WorkflowError::Invalid(_))));
    // a raw export still works
    assert_eq!(store.export().metadata.node_count, 4);
  }

  #[test]
  fn test_events_follow_successful_operations() {
    let (notifier, mut events) = ChannelNotifier::channel();
    let mut store = WorkflowStore::with_notifier(StoreConfig::default(), notifier);

    let action = store
      .add_node("start", NodeKind::Action, Placement::default())
      .unwrap();
    let _ = store.add_node("missing", NodeKind::Action, Placement::default());
    store.relabel_node(&action.node_id, "Fetch").unwrap();
    store.delete_node(&action.node_id).unwrap();
    store.delete_node("ghost").unwrap();
    store.save().unwrap();

    assert_eq!(
      events.try_recv().unwrap(),
      StoreEvent::NodeAdded {
        node_id: action.node_id.clone(),
        parent_id: "start".to_string(),
        kind: NodeKind::Action,
        slot: None,
      }
    );
    assert_eq!(
      events.try_recv().unwrap(),
      StoreEvent::NodeRelabeled {
        node_id: action.node_id.clone(),
        label: "Fetch".to_string(),
      }
    );
    assert_eq!(
      events.try_recv().unwrap(),
      StoreEvent::NodeDeleted {
        node_id: action.node_id.clone(),
        parent_ids: vec!["start".to_string()],
      }
    );
    assert_eq!(
      events.try_recv().unwrap(),
      StoreEvent::Exported {
        node_count: 1,
        max_depth: 0,
      }
    );
    assert!(events.try_recv().is_err());
  }
}
