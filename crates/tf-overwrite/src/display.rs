//! rewriting enum values in `metadata.display.yaml`
//!
//! Display entries live under `spec.ui.input.variables.<name>`. Only the `value` of each `enumValueLabels` entry is
//! replaced, labels stay as they are:
//! ```yaml
//! spec:
//!   ui:
//!     input:
//!       variables:
//!         source_image:
//!           name: source_image
//!           title: Source Image
//!           enumValueLabels:
//!             - label: wordpress-1
//!               value: projects/click-to-deploy-images/global/images/wordpress-1
//! ```
use crate::config::OverwriteConfig;
use crate::error::OverwriteError;
use crate::util::{read_optional, yaml_path_mut, StagedWrites};
use serde_yaml::Value;
use std::path::Path;

pub const DISPLAY_FILE: &str = "metadata.display.yaml";

const VARIABLES_PATH: [&str; 4] = ["spec", "ui", "input", "variables"];
const ENUM_VALUE_LABELS: &str = "enumValueLabels";

/// Overwrites enum values in `metadata.display.yaml` inside `dir_path`
///
/// A missing file is not an error.
#[tracing::instrument(level = "debug", skip(config))]
pub fn overwrite_display(config: &OverwriteConfig, dir_path: &Path) -> Result<(), OverwriteError> {
    let path = dir_path.join(DISPLAY_FILE);
    let Some(contents) = read_optional(&path)? else {
        tracing::debug!(path=%path.display(), "no display metadata file");
        return Ok(());
    };

    let mut writes = StagedWrites::default();
    if let Some(rewritten) = rewrite_display(&contents, config)? {
        writes.push(path, rewritten);
    }

    writes.flush()?;
    Ok(())
}

/// Rewrites a `metadata.display.yaml` document
///
/// Enum values are always mapped through `replacements`; `newValues` only decides which variables are visited.
/// Returns `None` when no value changed.
pub fn rewrite_display(
    contents: &str,
    config: &OverwriteConfig,
) -> Result<Option<String>, OverwriteError> {
    let original: Value = serde_yaml::from_str(contents).map_err(|source| {
        OverwriteError::MetadataParse {
            file: DISPLAY_FILE,
            source,
        }
    })?;

    let mut document = original.clone();
    let resolution = config.resolve();

    for name in resolution.names() {
        let Some(entry) = display_entry(&mut document, name) else {
            return Err(OverwriteError::MissingDisplayInfo { name: name.into() });
        };

        let Some(enum_value_labels) = entry
            .get_mut(ENUM_VALUE_LABELS)
            .and_then(Value::as_sequence_mut)
        else {
            tracing::trace!(variable = name, "no enum values");
            continue;
        };

        for value in enum_value_labels
            .iter_mut()
            .filter_map(|enum_value_label| enum_value_label.get_mut("value"))
        {
            let current = scalar_to_string(value);
            let Some(replacement) = current
                .as_deref()
                .and_then(|current| resolution.replacement(current))
            else {
                return Err(OverwriteError::EnumValueNotReplaced {
                    name: name.into(),
                    value: current.unwrap_or_else(|| format!("{value:?}")),
                });
            };

            tracing::debug!(variable = name, value = replacement, "overwrite enum value");
            *value = Value::String(replacement.to_string());
        }
    }

    if document == original {
        return Ok(None);
    }

    serde_yaml::to_string(&document)
        .map(Some)
        .map_err(|source| OverwriteError::MetadataSerialize {
            file: DISPLAY_FILE,
            source,
        })
}

fn display_entry<'a>(document: &'a mut Value, name: &str) -> Option<&'a mut Value> {
    let variables = yaml_path_mut(document, &VARIABLES_PATH)?;
    variables.get_mut(name).filter(|entry| entry.is_mapping())
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
