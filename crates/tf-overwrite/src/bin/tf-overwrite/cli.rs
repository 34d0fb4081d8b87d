//! tf-overwrite cli interface

use clap::{Parser, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Template directory to rewrite
    ///
    /// Defaults to the work directory.
    #[clap(short = 'C', long = "directory")]
    pub directory: Option<PathBuf>,

    /// Overwrite config (YAML or JSON)
    ///
    /// Reads the config from stdin unless provided.
    #[clap(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Only run the given rewriters
    ///
    /// Can be specified multiple times. Runs all rewriters when omitted.
    #[clap(long = "only", value_enum)]
    pub only: Vec<Rewriter>,
}

#[derive(ValueEnum, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rewriter {
    /// `variable` defaults and consumer label in *.tf files
    Tf,
    /// metadata.yaml
    Metadata,
    /// metadata.display.yaml
    Display,
}

impl Cli {
    pub fn runs(&self, rewriter: Rewriter) -> bool {
        self.only.is_empty() || self.only.contains(&rewriter)
    }
}

impl std::fmt::Display for Rewriter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rewriter::Tf => f.write_str("tf"),
            Rewriter::Metadata => f.write_str("metadata"),
            Rewriter::Display => f.write_str("display"),
        }
    }
}
