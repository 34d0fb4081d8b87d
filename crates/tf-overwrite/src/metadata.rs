//! rewriting default values in `metadata.yaml`
//!
//! Variables are described under `spec.interfaces.variables`:
//! ```yaml
//! spec:
//!   interfaces:
//!     variables:
//!     - name: source_image
//!       description: The image name for the disk for the VM instance.
//!       varType: string
//!       defaultValue: old-image
//! ```
use crate::config::{OverwriteConfig, Target};
use crate::error::OverwriteError;
use crate::util::{read_optional, yaml_path_mut, StagedWrites};
use serde_yaml::{Mapping, Value};
use std::path::Path;

pub const METADATA_FILE: &str = "metadata.yaml";

const VARIABLES_PATH: [&str; 3] = ["spec", "interfaces", "variables"];
const DEFAULT_VALUE: &str = "defaultValue";

/// Overwrites variable defaults in `metadata.yaml` inside `dir_path`
///
/// A missing file is not an error.
#[tracing::instrument(level = "debug", skip(config))]
pub fn overwrite_metadata(config: &OverwriteConfig, dir_path: &Path) -> Result<(), OverwriteError> {
    let path = dir_path.join(METADATA_FILE);
    let Some(contents) = read_optional(&path)? else {
        tracing::debug!(path=%path.display(), "no metadata file");
        return Ok(());
    };

    let mut writes = StagedWrites::default();
    if let Some(rewritten) = rewrite_metadata(&contents, config)? {
        writes.push(path, rewritten);
    }

    writes.flush()?;
    Ok(())
}

/// Rewrites a `metadata.yaml` document
///
/// Returns `None` when no value changed.
pub fn rewrite_metadata(
    contents: &str,
    config: &OverwriteConfig,
) -> Result<Option<String>, OverwriteError> {
    let original: Value = serde_yaml::from_str(contents).map_err(|source| {
        OverwriteError::MetadataParse {
            file: METADATA_FILE,
            source,
        }
    })?;

    let mut document = original.clone();
    let resolution = config.resolve();

    for &(name, target) in &resolution.targets {
        let descriptor = find_descriptor(&mut document, name);

        let (descriptor, new_value) = match target {
            Target::ReplaceCurrent => {
                let current = descriptor
                    .as_deref()
                    .and_then(|descriptor| descriptor.get(DEFAULT_VALUE))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                let (Some(descriptor), Some(current)) = (descriptor, current) else {
                    return Err(OverwriteError::MetadataMissingDefault { name: name.into() });
                };

                let Some(replacement) = resolution.replacement(&current) else {
                    return Err(OverwriteError::MetadataDefaultNotReplaced {
                        name: name.into(),
                        value: current,
                    });
                };

                (descriptor, replacement)
            }
            Target::Value(value) => {
                let Some(descriptor) = descriptor else {
                    return Err(OverwriteError::MetadataMissingEntry { name: name.into() });
                };

                (descriptor, value)
            }
        };

        tracing::debug!(variable = name, value = new_value, "overwrite metadata default");
        descriptor.insert(DEFAULT_VALUE.into(), new_value.into());
    }

    if document == original {
        return Ok(None);
    }

    serde_yaml::to_string(&document)
        .map(Some)
        .map_err(|source| OverwriteError::MetadataSerialize {
            file: METADATA_FILE,
            source,
        })
}

/// The descriptor mapping with `name: <name>`
fn find_descriptor<'a>(document: &'a mut Value, name: &str) -> Option<&'a mut Mapping> {
    yaml_path_mut(document, &VARIABLES_PATH)?
        .as_sequence_mut()?
        .iter_mut()
        .filter_map(Value::as_mapping_mut)
        .find(|descriptor| descriptor.get("name").and_then(Value::as_str) == Some(name))
}
