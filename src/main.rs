use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use branchwork_config::{BranchSlot, NodeKind, StoreConfig};
use branchwork_editor::{EditorHandle, WorkflowEditor};
use branchwork_workflow::{Placement, Workflow, WorkflowStore};

/// Branchwork - build and edit branching workflow trees
#[derive(Parser)]
#[command(name = "branchwork")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the store config (default: ~/.branchwork/config.json)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Create a workflow file holding a single start node
  New {
    workflow_file: PathBuf,
  },

  /// Add a node and print its id
  Add {
    workflow_file: PathBuf,

    /// Parent node id
    #[arg(long)]
    parent: String,

    /// Node kind: action, branch or end
    #[arg(long)]
    kind: NodeKind,

    /// Branch slot to fill when the parent is a branch node
    #[arg(long)]
    slot: Option<BranchSlot>,

    /// Index in the parent's children (default: 0)
    #[arg(long)]
    position: Option<usize>,
  },

  /// Delete a node and reconnect its parents to its children
  Delete {
    workflow_file: PathBuf,
    node_id: String,
  },

  /// Change a node's label
  Relabel {
    workflow_file: PathBuf,
    node_id: String,
    label: String,
  },

  /// Check the workflow's structure (exit status 1 when invalid)
  Validate {
    workflow_file: PathBuf,
  },

  /// Print the maximum depth below the root
  Depth {
    workflow_file: PathBuf,
  },

  /// Print the export record as JSON
  Export {
    workflow_file: PathBuf,

    /// Export even if the workflow fails validation
    #[arg(long)]
    force: bool,
  },
}

fn main() -> Result<ExitCode> {
  let cli = Cli::parse();

  // Logs go to stderr so stdout stays machine readable
  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };
  tracing_subscriber::registry()
    .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
    .with(filter)
    .init();

  let config = load_config(cli.config.as_deref())?;

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run(cli.command, config).await })
}

fn load_config(path: Option<&Path>) -> Result<StoreConfig> {
  match path {
    Some(path) => StoreConfig::load(path)
      .with_context(|| format!("failed to load config: {}", path.display())),
    None => match dirs::home_dir() {
      Some(home) => {
        let path = home.join(".branchwork").join("config.json");
        StoreConfig::load_or_default(&path)
          .with_context(|| format!("failed to load config: {}", path.display()))
      }
      None => Ok(StoreConfig::default()),
    },
  }
}

async fn run(command: Commands, config: StoreConfig) -> Result<ExitCode> {
  match command {
    Commands::New { workflow_file } => {
      if workflow_file.exists() {
        bail!("workflow file already exists: {}", workflow_file.display());
      }
      write_workflow(&workflow_file, &Workflow::new(&config)).await?;
      eprintln!("Created workflow: {}", workflow_file.display());
    }
    Commands::Add {
      workflow_file,
      parent,
      kind,
      slot,
      position,
    } => {
      let placement = Placement { slot, position };
      let inserted = edit(&workflow_file, config, |handle| async move {
        let inserted = handle.add_node(parent, kind, placement).await?;
        Ok((inserted.node_id.clone(), inserted.workflow))
      })
      .await?;
      println!("{inserted}");
    }
    Commands::Delete {
      workflow_file,
      node_id,
    } => {
      edit(&workflow_file, config, |handle| async move {
        let workflow = handle.delete_node(node_id).await?;
        Ok(((), workflow))
      })
      .await?;
    }
    Commands::Relabel {
      workflow_file,
      node_id,
      label,
    } => {
      edit(&workflow_file, config, |handle| async move {
        let workflow = handle.relabel_node(node_id, label).await?;
        Ok(((), workflow))
      })
      .await?;
    }
    Commands::Validate { workflow_file } => {
      let store = open_store(&workflow_file, config).await?;
      let validation = store.validate();
      match validation.reason() {
        None => println!("valid"),
        Some(reason) => {
          println!("invalid: {reason}");
          return Ok(ExitCode::FAILURE);
        }
      }
    }
    Commands::Depth { workflow_file } => {
      let store = open_store(&workflow_file, config).await?;
      println!("{}", store.depth());
    }
    Commands::Export {
      workflow_file,
      force,
    } => {
      let store = open_store(&workflow_file, config).await?;
      let record = if force {
        store.export()
      } else {
        store
          .save()
          .context("workflow failed validation (use --force to export anyway)")?
      };
      println!("{}", serde_json::to_string_pretty(&record)?);
    }
  }

  Ok(ExitCode::SUCCESS)
}

/// Run one mutation through an editor task and write the resulting snapshot back.
async fn edit<T, F, Fut>(workflow_file: &Path, config: StoreConfig, op: F) -> Result<T>
where
  F: FnOnce(EditorHandle) -> Fut,
  Fut: std::future::Future<Output = Result<(T, std::sync::Arc<Workflow>)>>,
{
  let store = open_store(workflow_file, config).await?;
  let editor = WorkflowEditor::new(store);
  let handle = editor.handle();
  let cancel = CancellationToken::new();
  let task = tokio::spawn(editor.start(cancel.clone()));

  let result = op(handle).await;
  cancel.cancel();
  task.await.context("workflow editor task failed")?;

  let (output, workflow) = result?;
  write_workflow(workflow_file, &workflow).await?;
  Ok(output)
}

async fn open_store(workflow_file: &Path, config: StoreConfig) -> Result<WorkflowStore> {
  let workflow = read_workflow(workflow_file).await?;
  debug!(nodes = workflow.len(), root_id = %workflow.root_id, "loaded workflow");
  Ok(WorkflowStore::from_snapshot(workflow, config))
}

async fn read_workflow(workflow_file: &Path) -> Result<Workflow> {
  let content = tokio::fs::read_to_string(workflow_file)
    .await
    .with_context(|| format!("failed to read workflow file: {}", workflow_file.display()))?;

  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse workflow file: {}", workflow_file.display()))
}

async fn write_workflow(workflow_file: &Path, workflow: &Workflow) -> Result<()> {
  let content = serde_json::to_string_pretty(workflow)?;
  tokio::fs::write(workflow_file, content)
    .await
    .with_context(|| format!("failed to write workflow file: {}", workflow_file.display()))
}
