//! Branchwork Config
//!
//! This crate contains the serializable vocabulary shared by the branchwork crates:
//! the node kinds a workflow tree is built from, the named slots of a branch node,
//! and the settings record that tunes how a workflow store applies edits.
//!
//! Settings can be loaded from:
//! - JSON files (via CLI with `--config=config.json`)
//! - Inline JSON strings (tests, embedding applications)
//!
//! Every settings field has a default, so an empty object `{}` is a valid config.

mod enums;
mod error;
mod settings;

pub use enums::{BranchSlot, NodeKind, SlotPolicy};
pub use error::ConfigError;
pub use settings::StoreConfig;
