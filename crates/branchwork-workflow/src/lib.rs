//! Branchwork Workflow
//!
//! This crate owns the workflow tree: a flat map of nodes keyed by id plus the id
//! of the start node. Nodes refer to each other by id only, so every traversal is a
//! lookup into the map.
//!
//! Key pieces:
//! - [`Workflow`] is an immutable snapshot. Edits ([`Workflow::insert_node`],
//!   [`Workflow::remove_node`], [`Workflow::relabel_node`]) return a new snapshot
//!   and leave the old one untouched, or fail without any change.
//! - [`validate`] checks a snapshot for structural corruption (missing root,
//!   orphans, over-full action nodes, dangling references, cycles).
//! - [`compute_depth`] and [`export_snapshot`] are pure reads.
//! - [`WorkflowStore`] holds the current snapshot, allocates node ids and swaps in
//!   each successful edit, notifying a [`StoreNotifier`].

mod depth;
mod edit;
mod error;
mod events;
mod export;
mod graph;
mod node;
mod store;
mod validate;
mod workflow;

pub use branchwork_config::{BranchSlot, NodeKind, SlotPolicy, StoreConfig};
pub use depth::compute_depth;
pub use edit::Placement;
pub use error::WorkflowError;
pub use events::{ChannelNotifier, NoopNotifier, StoreEvent, StoreNotifier};
pub use export::{ExportMetadata, ExportRecord, export_snapshot, export_snapshot_at};
pub use graph::Graph;
pub use node::{Branches, Node, NodeBody, NodeShapeError};
pub use store::{Inserted, WorkflowStore};
pub use validate::{IntegrityIssue, Validation, validate};
pub use workflow::Workflow;
