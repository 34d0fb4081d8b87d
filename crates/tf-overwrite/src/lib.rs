//! # tf-overwrite - overwrite defaults of published terraform templates
//!
//! A released template ships with defaults (for example a VM image) that a consumer wants replaced before deploying.
//! `tf-overwrite` rewrites those defaults in place across three documents of a template directory.
//!
//! ## Introduction for developers
//!
//! Read this to understand how `tf-overwrite` works internally.
//!
//! ### Configuration
//!
//! Every rewriter is driven by the same [config::OverwriteConfig], parsed from a YAML or JSON payload:
//!
//! ```yaml
//! variables: [source_image]
//! replacements:
//!   projects/old/global/images/image-1: projects/new/global/images/image-1
//! newValues:
//!   zone: us-central1-a
//! consumerLabel: my-partner-solution
//! ```
//!
//! There are two modes (see [config::OverwriteConfig::resolve]):
//! - **direct**: `newValues` is not empty. Its keys are the variables to rewrite and its values the new defaults.
//!   `variables` and `replacements` are ignored for choosing variables.
//! - **legacy**: each name in `variables` is looked up, and its current default is mapped through `replacements`.
//!
//! ### Terraform files
//!
//! see [variables::overwrite_tf]
//!
//! All `*.tf` files of the directory are parsed with [hcl_edit] into [hcl_documents::HclDocuments]. Unlike a plain
//! value tree an [hcl_edit::structure::Body] keeps whitespace and comments, so only the edited `default` expression
//! renders differently. Given
//!
//! ```hcl
//! variable "source_image" {
//!   type    = string
//!   default = "projects/old/global/images/image-1" # keep me
//! }
//! ```
//!
//! only the string literal changes, the alignment and the comment stay.
//!
//! With a consumer label configured the `default_labels` block of the `provider "google"` block is upserted (see
//! [labels]).
//!
//! ### Metadata files
//!
//! see [metadata::overwrite_metadata] and [display::overwrite_display]
//!
//! `metadata.yaml` and `metadata.display.yaml` are parsed into [serde_yaml::Value], edited and serialized again.
//! Mappings keep their key order; formatting and comments of these files are not preserved.
//!
//! ### Failures
//!
//! Each rewriter validates all variables in memory before writing (see [util::StagedWrites]). A failing call leaves
//! every file of the directory as it was. Errors are reported as [error::OverwriteError].
//!
use std::path::Path;

pub mod config;
pub mod display;
pub mod error;
pub mod hcl_documents;
pub mod labels;
pub mod metadata;
pub mod util;
pub mod variables;

pub use config::{get_overwrite_config, OverwriteConfig};
pub use display::overwrite_display;
pub use error::{ErrorKind, OverwriteError};
pub use metadata::overwrite_metadata;
pub use variables::overwrite_tf;

/// Runs all rewriters against `dir_path`
///
/// Terraform files first, then `metadata.yaml`, then `metadata.display.yaml`. Stops at the first failing rewriter;
/// rewriters that already succeeded have written their files.
pub fn overwrite_all(config: &OverwriteConfig, dir_path: &Path) -> Result<(), OverwriteError> {
    overwrite_tf(config, dir_path)?;
    overwrite_metadata(config, dir_path)?;
    overwrite_display(config, dir_path)?;
    Ok(())
}
