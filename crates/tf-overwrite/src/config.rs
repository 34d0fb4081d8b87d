//! overwrite configuration and value resolution
//!
//! The same [OverwriteConfig] drives all rewriters. [OverwriteConfig::resolve] decides which variables get touched and
//! where their new values come from, so every rewriter applies the same precedence rules.
use crate::error::OverwriteError;
use indexmap::IndexMap;

/// Input contract shared by all rewriters
///
/// Fields are camelCase in the payload (`variables`, `replacements`, `newValues`, `consumerLabel`) and all optional.
#[derive(serde::Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct OverwriteConfig {
    /// Variables to process in legacy mode
    pub variables: Vec<String>,
    /// Old value to new value (legacy mode)
    pub replacements: IndexMap<String, String>,
    /// Variable name to new value (direct mode)
    pub new_values: IndexMap<String, String>,
    /// Upserted into the provider labels when set
    pub consumer_label: Option<String>,
}

impl OverwriteConfig {
    /// Parses a YAML or JSON payload
    ///
    /// Only the shape is checked here. What is required depends on the mode and is validated by each rewriter.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, OverwriteError> {
        serde_yaml::from_slice(bytes).map_err(OverwriteError::ConfigParse)
    }

    /// Which variables to touch and how to compute their new value
    pub fn resolve(&self) -> Resolution<'_> {
        if !self.new_values.is_empty() {
            return Resolution {
                mode: Mode::Direct,
                targets: self
                    .new_values
                    .iter()
                    .map(|(name, value)| (name.as_str(), Target::Value(value.as_str())))
                    .collect(),
                replacements: &self.replacements,
            };
        }

        Resolution {
            mode: Mode::Legacy,
            targets: self
                .variables
                .iter()
                .map(|name| (name.as_str(), Target::ReplaceCurrent))
                .collect(),
            replacements: &self.replacements,
        }
    }

    /// The consumer label, unless absent or empty
    pub fn consumer_label(&self) -> Option<&str> {
        self.consumer_label.as_deref().filter(|label| !label.is_empty())
    }
}

/// Parses an overwrite config payload
pub fn get_overwrite_config(bytes: &[u8]) -> Result<OverwriteConfig, OverwriteError> {
    OverwriteConfig::from_slice(bytes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `newValues` is set: variable name maps straight to its new value
    Direct,
    /// `variables` + `replacements`: the current value maps to the new value
    Legacy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'c> {
    /// Use this value
    Value(&'c str),
    /// Look up the current value in `replacements`
    ReplaceCurrent,
}

/// Outcome of [OverwriteConfig::resolve]
#[derive(Debug)]
pub struct Resolution<'c> {
    pub mode: Mode,
    /// Variable names in processing order
    pub targets: Vec<(&'c str, Target<'c>)>,
    replacements: &'c IndexMap<String, String>,
}

impl<'c> Resolution<'c> {
    /// Replacement for a current value
    pub fn replacement(&self, current: &str) -> Option<&'c str> {
        self.replacements.get(current).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &'c str> + '_ {
        self.targets.iter().map(|(name, _)| *name)
    }
}
