//! Workflow editor with channel-based commands.
//!
//! The `WorkflowEditor` owns an mpsc channel of edit commands and the store they
//! are applied to. Callers talk to it through `EditorHandle`s.

use std::sync::Arc;

use branchwork_workflow::{
  ExportRecord, Inserted, NodeKind, Placement, StoreNotifier, Validation, Workflow, WorkflowError,
  WorkflowStore,
};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::EditorError;

type Reply<T> = oneshot::Sender<T>;

/// A request sent to the editor task, carrying its reply channel.
enum Command {
  AddNode {
    parent_id: String,
    kind: NodeKind,
    placement: Placement,
    reply: Reply<Result<Inserted, WorkflowError>>,
  },
  DeleteNode {
    node_id: String,
    reply: Reply<Result<Arc<Workflow>, WorkflowError>>,
  },
  RelabelNode {
    node_id: String,
    label: String,
    reply: Reply<Result<Arc<Workflow>, WorkflowError>>,
  },
  Snapshot {
    reply: Reply<Arc<Workflow>>,
  },
  Validate {
    reply: Reply<Validation>,
  },
  Depth {
    reply: Reply<usize>,
  },
  Export {
    reply: Reply<ExportRecord>,
  },
  Save {
    reply: Reply<Result<ExportRecord, WorkflowError>>,
  },
}

impl Command {
  fn name(&self) -> &'static str {
    match self {
      Command::AddNode { .. } => "add_node",
      Command::DeleteNode { .. } => "delete_node",
      Command::RelabelNode { .. } => "relabel_node",
      Command::Snapshot { .. } => "snapshot",
      Command::Validate { .. } => "validate",
      Command::Depth { .. } => "depth",
      Command::Export { .. } => "export",
      Command::Save { .. } => "save",
    }
  }
}

/// Single owner of a workflow store.
///
/// # Usage
///
/// ```ignore
/// let editor = WorkflowEditor::new(store);
///
/// // Get handles for callers (UI handlers, request tasks, etc.)
/// let handle = editor.handle();
///
/// // Start the command loop
/// let cancel = CancellationToken::new();
/// let store = editor.start(cancel).await;
/// ```
pub struct WorkflowEditor<N: StoreNotifier> {
  sender: mpsc::Sender<Command>,
  receiver: mpsc::Receiver<Command>,
  store: WorkflowStore<N>,
}

impl<N: StoreNotifier> WorkflowEditor<N> {
  /// Create a new editor around `store`.
  pub fn new(store: WorkflowStore<N>) -> Self {
    Self::with_buffer_size(store, 100)
  }

  /// Create a new editor with a custom command buffer size.
  pub fn with_buffer_size(store: WorkflowStore<N>, buffer_size: usize) -> Self {
    let (sender, receiver) = mpsc::channel(buffer_size);
    Self {
      sender,
      receiver,
      store,
    }
  }

  /// Get a handle for sending commands to this editor.
  pub fn handle(&self) -> EditorHandle {
    EditorHandle {
      sender: self.sender.clone(),
    }
  }

  /// Run the command loop.
  ///
  /// Commands are applied one at a time in arrival order. The loop ends when the
  /// cancellation token fires or every handle has been dropped, and hands the
  /// store back to the caller.
  pub async fn start(self, cancel: CancellationToken) -> WorkflowStore<N> {
    let WorkflowEditor {
      sender,
      mut receiver,
      mut store,
    } = self;
    // Only handles keep the channel open from here on.
    drop(sender);

    info!(
      root_id = %store.snapshot().root_id,
      nodes = store.snapshot().len(),
      "starting workflow editor"
    );

    loop {
      tokio::select! {
          _ = cancel.cancelled() => {
              info!("workflow editor cancelled");
              break;
          }
          command = receiver.recv() => {
              match command {
                  Some(command) => {
                      debug!(command = command.name(), "applying command");
                      apply(&mut store, command);
                  }
                  None => {
                      // All handles dropped, exit loop
                      info!("workflow editor channel closed");
                      break;
                  }
              }
          }
      }
    }

    store
  }
}

/// Apply one command and send its reply. A dropped reply receiver is ignored.
fn apply<N: StoreNotifier>(store: &mut WorkflowStore<N>, command: Command) {
  match command {
    Command::AddNode {
      parent_id,
      kind,
      placement,
      reply,
    } => {
      let _ = reply.send(store.add_node(&parent_id, kind, placement));
    }
    Command::DeleteNode { node_id, reply } => {
      let _ = reply.send(store.delete_node(&node_id));
    }
    Command::RelabelNode {
      node_id,
      label,
      reply,
    } => {
      let _ = reply.send(store.relabel_node(&node_id, label));
    }
    Command::Snapshot { reply } => {
      let _ = reply.send(store.snapshot());
    }
    Command::Validate { reply } => {
      let _ = reply.send(store.validate());
    }
    Command::Depth { reply } => {
      let _ = reply.send(store.depth());
    }
    Command::Export { reply } => {
      let _ = reply.send(store.export());
    }
    Command::Save { reply } => {
      let _ = reply.send(store.save());
    }
  }
}

/// Cloneable handle to a running `WorkflowEditor`.
#[derive(Debug, Clone)]
pub struct EditorHandle {
  sender: mpsc::Sender<Command>,
}

impl EditorHandle {
  async fn request<T>(
    &self,
    build: impl FnOnce(Reply<T>) -> Command,
  ) -> Result<T, EditorError> {
    let (reply, response) = oneshot::channel();
    self
      .sender
      .send(build(reply))
      .await
      .map_err(|_| EditorError::Closed)?;
    response.await.map_err(|_| EditorError::Closed)
  }

  pub async fn add_node(
    &self,
    parent_id: impl Into<String>,
    kind: NodeKind,
    placement: Placement,
  ) -> Result<Inserted, EditorError> {
    let parent_id = parent_id.into();
    let inserted = self
      .request(|reply| Command::AddNode {
        parent_id,
        kind,
        placement,
        reply,
      })
      .await??;
    Ok(inserted)
  }

  pub async fn delete_node(&self, node_id: impl Into<String>) -> Result<Arc<Workflow>, EditorError> {
    let node_id = node_id.into();
    let workflow = self
      .request(|reply| Command::DeleteNode { node_id, reply })
      .await??;
    Ok(workflow)
  }

  pub async fn relabel_node(
    &self,
    node_id: impl Into<String>,
    label: impl Into<String>,
  ) -> Result<Arc<Workflow>, EditorError> {
    let node_id = node_id.into();
    let label = label.into();
    let workflow = self
      .request(|reply| Command::RelabelNode {
        node_id,
        label,
        reply,
      })
      .await??;
    Ok(workflow)
  }

  pub async fn snapshot(&self) -> Result<Arc<Workflow>, EditorError> {
    self.request(|reply| Command::Snapshot { reply }).await
  }

  pub async fn validate(&self) -> Result<Validation, EditorError> {
    self.request(|reply| Command::Validate { reply }).await
  }

  pub async fn depth(&self) -> Result<usize, EditorError> {
    self.request(|reply| Command::Depth { reply }).await
  }

  /// Export the current snapshot without validating it.
  pub async fn export(&self) -> Result<ExportRecord, EditorError> {
    self.request(|reply| Command::Export { reply }).await
  }

  /// Validate, then export.
  pub async fn save(&self) -> Result<ExportRecord, EditorError> {
    let record = self.request(|reply| Command::Save { reply }).await??;
    Ok(record)
  }

  /// Whether the editor has stopped accepting commands.
  pub fn is_closed(&self) -> bool {
    self.sender.is_closed()
  }
}
