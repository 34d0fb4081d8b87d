//! consumer label upsert
//!
//! The consumer label lives in the `default_labels` block of the `provider "google"` block:
//! ```hcl
//! provider "google" {
//!   project = var.project_id
//!   default_labels {
//!     goog-partner-solution = "consumer-label"
//!   }
//! }
//! ```
//! The block and the key are created when absent, an existing value is replaced. New structures are indented like
//! their siblings. Modules without the provider block are left alone.
use crate::hcl_documents::{expand_oneline, indent, indented_attribute, sibling_indent, HclDocuments};
use hcl_edit::expr::Expression;
use hcl_edit::structure::{Block, Body};
use hcl_edit::{Decorate, Decorated, Ident};

pub const PROVIDER: &str = "google";
pub const LABELS_BLOCK: &str = "default_labels";
pub const CONSUMER_LABEL_KEY: &str = "goog-partner-solution";

/// Upserts `consumer_label` into the first `provider "google"` block
///
/// Returns whether a provider block was found.
pub fn upsert_consumer_label(documents: &mut HclDocuments, consumer_label: &str) -> bool {
    let Some(provider) = documents.find_block_mut("provider", &[PROVIDER]) else {
        tracing::debug!("no provider block, skipping consumer label");
        return false;
    };

    if provider.body.get_attribute(LABELS_BLOCK).is_some() {
        tracing::warn!(
            "{LABELS_BLOCK} is set as an attribute of the provider, leaving the consumer label untouched"
        );
        return true;
    }

    let value = Expression::String(Decorated::new(consumer_label.to_string()));
    // providers are root blocks, so one level of indentation is the indentation of their structures
    let step = sibling_indent(&provider.body).unwrap_or_else(|| indent(1));
    let nested = step.repeat(2);

    if let Some(labels) = provider.body.blocks_mut().find(is_labels_block) {
        tracing::debug!(consumer_label, "update consumer label");
        let attribute_indent = sibling_indent(&labels.body).unwrap_or(nested);
        upsert_attribute(&mut labels.body, CONSUMER_LABEL_KEY, value, &attribute_indent, &step);
        return true;
    }

    tracing::debug!(consumer_label, "insert consumer label");
    let mut labels = Block::new(Decorated::new(Ident::new(LABELS_BLOCK)));
    labels.decor_mut().set_prefix(step.clone());
    labels.body.decor_mut().set_suffix(step.clone());
    labels
        .body
        .push(indented_attribute(CONSUMER_LABEL_KEY, value, &nested));

    expand_oneline(&mut provider.body, &step, "");
    provider.body.push(labels);

    true
}

fn is_labels_block(block: &&mut Block) -> bool {
    block.ident.value().as_str() == LABELS_BLOCK && block.labels.is_empty()
}

/// Replaces the value of `key`, keeping its decoration, or appends it
fn upsert_attribute(body: &mut Body, key: &str, value: Expression, indent: &str, closing: &str) {
    if let Some(mut attribute) = body.get_attribute_mut(key) {
        let expr = attribute.value_mut();
        let decor = expr.decor().clone();
        *expr = value;
        *expr.decor_mut() = decor;
        return;
    }

    expand_oneline(body, indent, closing);
    body.push(indented_attribute(key, value, indent));
}
