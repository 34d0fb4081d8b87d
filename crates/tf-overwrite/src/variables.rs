//! rewriting `variable` declarations of a terraform module
//!
//! Only the `default` attribute of the named `variable` blocks is touched. Everything else, including the decoration
//! around a replaced default, renders back as it was read.
use crate::config::{OverwriteConfig, Target};
use crate::error::OverwriteError;
use crate::hcl_documents::{expand_oneline, indent, indented_attribute, sibling_indent, HclDocuments};
use crate::labels;
use hcl_edit::expr::Expression;
use hcl_edit::structure::{Block, Body};
use hcl_edit::{Decorate, Decorated};
use std::path::Path;

/// Overwrites variable defaults of all `*.tf` files in `dir_path`
///
/// Upserts the consumer label into the provider block when configured. Files are only written once every variable
/// was validated.
#[tracing::instrument(level = "debug", skip(config))]
pub fn overwrite_tf(config: &OverwriteConfig, dir_path: &Path) -> Result<(), OverwriteError> {
    let mut documents = HclDocuments::default();
    documents.load_directory(dir_path)?;

    rewrite_variables(&mut documents, config)?;

    if let Some(consumer_label) = config.consumer_label() {
        labels::upsert_consumer_label(&mut documents, consumer_label);
    }

    documents.staged_writes().flush()?;
    Ok(())
}

/// Overwrites variable defaults in memory
pub fn rewrite_variables(
    documents: &mut HclDocuments,
    config: &OverwriteConfig,
) -> Result<(), OverwriteError> {
    let resolution = config.resolve();

    for &(name, target) in &resolution.targets {
        let Some((_, block)) = documents.find_block("variable", &[name]) else {
            return Err(OverwriteError::VariableNotFound { name: name.into() });
        };

        let new_value = match target {
            Target::ReplaceCurrent => {
                let Some(default) = block.body.get_attribute("default") else {
                    return Err(OverwriteError::MissingDefault { name: name.into() });
                };
                ensure_string_type(name, &block.body)?;

                let Expression::String(current) = &default.value else {
                    return Err(OverwriteError::NotStringType { name: name.into() });
                };

                resolution.replacement(current.value()).ok_or_else(|| {
                    OverwriteError::DefaultNotReplaced {
                        name: name.into(),
                        value: current.value().clone(),
                    }
                })?
            }
            Target::Value(value) => {
                ensure_string_type(name, &block.body)?;
                value
            }
        };

        let Some(block) = documents.find_block_mut("variable", &[name]) else {
            return Err(OverwriteError::VariableNotFound { name: name.into() });
        };

        tracing::debug!(variable = name, value = new_value, mode = ?resolution.mode, "overwrite default");
        set_default(block, new_value);
    }

    Ok(())
}

/// Fails unless the variable is declared with `type = string`
///
/// The pre 0.12 quoted form `type = "string"` is accepted as well.
fn ensure_string_type(name: &str, body: &Body) -> Result<(), OverwriteError> {
    let is_string = body
        .get_attribute("type")
        .map(|attribute| match &attribute.value {
            Expression::Variable(var) => var.value().as_str() == "string",
            Expression::String(s) => s.value() == "string",
            _ => false,
        })
        .unwrap_or(false);

    if !is_string {
        return Err(OverwriteError::NotStringType { name: name.into() });
    }

    Ok(())
}

/// Sets the `default` attribute, appending it when missing
///
/// An appended default is indented like the other attributes of the block. A one-line block is spread over multiple
/// lines first.
fn set_default(block: &mut Block, value: &str) {
    let new_value = Expression::String(Decorated::new(value.to_string()));

    if let Some(mut attribute) = block.body.get_attribute_mut("default") {
        let expr = attribute.value_mut();
        let decor = expr.decor().clone();
        *expr = new_value;
        *expr.decor_mut() = decor;
        return;
    }

    let attribute_indent = sibling_indent(&block.body).unwrap_or_else(|| indent(1));
    expand_oneline(&mut block.body, &attribute_indent, "");
    block
        .body
        .push(indented_attribute("default", new_value, &attribute_indent));
}
