//! Store events and notifiers.
//!
//! Events are emitted after each successful store operation so consumers can
//! re-render, persist, or log. Rejected operations emit nothing.

use branchwork_config::{BranchSlot, NodeKind};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Events emitted by a workflow store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreEvent {
  /// A node was created and attached to its parent.
  NodeAdded {
    node_id: String,
    parent_id: String,
    kind: NodeKind,
    slot: Option<BranchSlot>,
  },

  /// A node was removed and its parents reconnected.
  NodeDeleted {
    node_id: String,
    parent_ids: Vec<String>,
  },

  /// A node's label changed.
  NodeRelabeled { node_id: String, label: String },

  /// A validated export was produced.
  Exported { node_count: usize, max_depth: usize },
}

/// Trait for receiving store events.
///
/// The store calls `notify` once per successful operation. Implementations
/// decide what to do with the event.
pub trait StoreNotifier: Send + Sync {
  fn notify(&self, event: StoreEvent);
}

/// A no-op notifier that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl StoreNotifier for NoopNotifier {
  fn notify(&self, _event: StoreEvent) {}
}

/// A notifier that sends events to an unbounded channel.
///
/// Event volume is one per edit, so the channel is left unbounded.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<StoreEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<StoreEvent>) -> Self {
    Self { sender }
  }

  /// Create a notifier together with the receiving end of its channel.
  pub fn channel() -> (Self, mpsc::UnboundedReceiver<StoreEvent>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Self::new(sender), receiver)
  }
}

impl StoreNotifier for ChannelNotifier {
  fn notify(&self, event: StoreEvent) {
    // Ignore send errors - receiver may have been dropped
    let _ = self.sender.send(event);
  }
}
