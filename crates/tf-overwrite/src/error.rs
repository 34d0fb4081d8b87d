//! errors returned by the rewriters
//!
//! Every failure maps onto one [ErrorKind]. Messages name the offending variable or value without quoting so callers
//! can match on them verbatim.
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum OverwriteError {
    #[error("failure parsing overwrite config")]
    ConfigParse(#[source] serde_yaml::Error),

    #[error("failure parsing terraform module: {}", path.display())]
    ModuleParse {
        path: PathBuf,
        #[source]
        source: hcl_edit::parser::Error,
    },

    #[error("failure parsing {file}")]
    MetadataParse {
        file: &'static str,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failure serializing {file}")]
    MetadataSerialize {
        file: &'static str,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("variable: {name} not found")]
    VariableNotFound { name: String },

    #[error("variable: {name} must have default value")]
    MissingDefault { name: String },

    #[error("image variable: {name} must be type string")]
    NotStringType { name: String },

    #[error("default value: {value} of variable: {name} not found in replacements")]
    DefaultNotReplaced { name: String, value: String },

    #[error("Missing valid default value for variable: {name}")]
    MetadataMissingDefault { name: String },

    #[error("default value: {value} of variable: {name} in metadata.yaml not found in replacements")]
    MetadataDefaultNotReplaced { name: String, value: String },

    #[error("missing variable entry for variable: {name}")]
    MetadataMissingEntry { name: String },

    #[error("missing valid display info for variable: {name}")]
    MissingDisplayInfo { name: String },

    #[error("enum value: {value} of variable: {name} in metadata.display.yaml not found in replacements")]
    EnumValueNotReplaced { name: String, value: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Coarse classification of [OverwriteError]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A document (config payload, terraform file or metadata) is malformed
    Parse,
    /// A variable, default value or replacement entry does not exist
    NotFound,
    /// A variable is not of type string or lacks a required default
    Type,
    /// Reading or writing the target directory failed
    Io,
}

impl OverwriteError {
    pub fn kind(&self) -> ErrorKind {
        use OverwriteError::*;

        match self {
            ConfigParse(_) | ModuleParse { .. } | MetadataParse { .. } | MetadataSerialize { .. } => {
                ErrorKind::Parse
            }
            VariableNotFound { .. }
            | DefaultNotReplaced { .. }
            | MetadataMissingDefault { .. }
            | MetadataDefaultNotReplaced { .. }
            | MetadataMissingEntry { .. }
            | MissingDisplayInfo { .. }
            | EnumValueNotReplaced { .. } => ErrorKind::NotFound,
            MissingDefault { .. } | NotStringType { .. } => ErrorKind::Type,
            Io(_) => ErrorKind::Io,
        }
    }

    /// The underlying io error, if any
    ///
    /// Lets callers tell permission problems apart from content problems.
    pub fn io_error(&self) -> Option<&std::io::Error> {
        match self {
            OverwriteError::Io(err) => Some(err),
            _ => None,
        }
    }
}
