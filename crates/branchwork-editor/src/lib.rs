//! Branchwork Editor
//!
//! A `WorkflowStore` has no internal locking. This crate puts one behind a single
//! owner task so any number of callers can edit the same workflow concurrently.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐  ┌───────────────┐
//! │ EditorHandle  │  │ EditorHandle  │   (cloneable, one per caller)
//! └───────┬───────┘  └───────┬───────┘
//!         │   Command + oneshot reply
//!         ▼                  ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     WorkflowEditor                          │
//! │  - owns the mpsc receiver and the WorkflowStore             │
//! │  - applies commands one at a time, in arrival order         │
//! │  - start(cancel) runs until cancelled or all handles drop   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use branchwork_editor::WorkflowEditor;
//! use branchwork_workflow::{NodeKind, Placement, WorkflowStore};
//! use tokio_util::sync::CancellationToken;
//!
//! let editor = WorkflowEditor::new(WorkflowStore::default());
//! let handle = editor.handle();
//!
//! let cancel = CancellationToken::new();
//! tokio::spawn(editor.start(cancel.clone()));
//!
//! let added = handle.add_node("start", NodeKind::Action, Placement::default()).await?;
//! ```

mod editor;
mod error;

pub use editor::{EditorHandle, WorkflowEditor};
pub use error::EditorError;
