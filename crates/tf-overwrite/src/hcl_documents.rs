//! collection of hcl documents (editable [Body], original text and path to source file)
//!
//! [HclDocuments] tracks, per document,
//! - the source path
//! - the text it was parsed from
//! - the parsed body, which stays editable
//! - whether any edit touched it
//!
//! and defines a numeric index for each. Once added those indices are stable (removal is not possible).
//! Bodies come from [hcl_edit] so untouched structures render back exactly as they were read.
use crate::error::OverwriteError;
use crate::util::StagedWrites;
use hcl_edit::expr::Expression;
use hcl_edit::structure::{Attribute, Block, Body};
use hcl_edit::{Decorate, Decorated, Ident};
use std::path::{Path, PathBuf};

#[derive(Default, Debug)]
pub struct HclDocuments {
    documents: Vec<HclDocument>,
}

#[derive(Debug)]
pub struct HclDocument {
    source: Source,
    original: String,
    body: Body,
    crlf: bool,
    modified: bool,
}

impl HclDocument {
    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Current text of the document
    ///
    /// Unmodified documents return their original text verbatim. Modified documents keep CRLF line endings if the
    /// original used them throughout.
    pub fn render(&self) -> String {
        if !self.modified {
            return self.original.clone();
        }

        let rendered = self.body.to_string();
        if self.crlf {
            rendered.replace("\r\n", "\n").replace('\n', "\r\n")
        } else {
            rendered
        }
    }
}

impl HclDocuments {
    /// Parses and indexes an hcl document
    pub fn insert(
        &mut self,
        contents: impl Into<String>,
        path: impl Into<Option<PathBuf>>,
    ) -> Result<usize, hcl_edit::parser::Error> {
        let original = contents.into();
        let body = hcl_edit::parser::parse_body(&original)?;
        let crlf = uses_crlf(&original);

        let index = self.documents.len();
        self.documents.push(HclDocument {
            source: path.into(),
            original,
            body,
            crlf,
            modified: false,
        });

        Ok(index)
    }

    pub fn get(&self, index: usize) -> &HclDocument {
        &self.documents[index]
    }

    pub fn documents(&self) -> impl Iterator<Item = (usize, &HclDocument)> {
        self.documents.iter().enumerate()
    }

    pub fn source_count(&self) -> usize {
        self.documents.len()
    }

    /// First root block, in document order, matching identifier and labels
    ///
    /// Labels are compared by exact string value. Extra labels on the block are not allowed.
    pub fn find_block(&self, ident: &str, labels: &[&str]) -> Option<(usize, &Block)> {
        self.documents.iter().enumerate().find_map(|(index, document)| {
            document
                .body
                .blocks()
                .find(|block| block_matches(block, ident, labels))
                .map(|block| (index, block))
        })
    }

    /// Mutable access to a root block found via [HclDocuments::find_block]
    ///
    /// The owning document is marked as modified.
    pub fn find_block_mut(&mut self, ident: &str, labels: &[&str]) -> Option<&mut Block> {
        let (index, _) = self.find_block(ident, labels)?;

        let document = &mut self.documents[index];
        document.modified = true;
        document
            .body
            .blocks_mut()
            .find(|block| block_matches(block, ident, labels))
    }

    /// A write for every document that was modified and has a path
    pub fn staged_writes(&self) -> StagedWrites {
        let mut writes = StagedWrites::default();
        for document in self.documents.iter().filter(|document| document.modified) {
            let Some(path) = &document.source else {
                continue;
            };

            let rendered = document.render();
            if rendered == document.original {
                tracing::trace!(path=%path.display(), "unchanged after rewrite");
                continue;
            }

            writes.push(path.clone(), rendered);
        }

        writes
    }
}

impl HclDocuments {
    pub fn load_file(&mut self, file_path: &Path) -> Result<(), OverwriteError> {
        tracing::info!(path=%file_path.display(), "loading file");

        let file_contents = std::fs::read_to_string(file_path)?;
        self.insert(file_contents, file_path.to_path_buf())
            .map_err(|source| OverwriteError::ModuleParse {
                path: file_path.to_path_buf(),
                source,
            })?;

        Ok(())
    }

    /// Loads every `*.tf` file directly inside `dir_path`, in file name order
    pub fn load_directory(&mut self, dir_path: &Path) -> Result<(), OverwriteError> {
        let mut file_paths = vec![];

        let read_dir = std::fs::read_dir(dir_path)?;
        for dir_entry in read_dir {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }

            let is_tf_file = dir_entry.file_name().to_string_lossy().ends_with(".tf");
            if !is_tf_file {
                continue;
            }

            file_paths.push(dir_entry.path());
        }

        file_paths.sort();
        for file_path in &file_paths {
            self.load_file(file_path)?;
        }

        Ok(())
    }
}

fn block_matches(block: &Block, ident: &str, labels: &[&str]) -> bool {
    block.ident.value().as_str() == ident
        && block.labels.len() == labels.len()
        && block
            .labels
            .iter()
            .zip(labels)
            .all(|(label, expected)| label.as_str() == *expected)
}

fn uses_crlf(text: &str) -> bool {
    let crlf = text.matches("\r\n").count();
    crlf > 0 && crlf == text.matches('\n').count()
}

/// Indentation of structures `depth` blocks deep
pub(crate) fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

/// Indentation of the last structure of a multi-line body
///
/// `None` for empty and one-line bodies, or when the last structure shares its line with something else.
pub(crate) fn sibling_indent(body: &Body) -> Option<String> {
    if body.prefer_oneline() {
        return None;
    }

    let prefix = body.iter().last()?.decor().prefix()?;
    let line = prefix.rsplit('\n').next().unwrap_or_default();
    line.chars()
        .all(|c| c == ' ' || c == '\t')
        .then(|| line.to_string())
}

/// Lays out a one-line body (`{ type = string }`) over multiple lines
///
/// Existing attributes move onto their own line with `indent`, the closing brace gets `closing` in front.
pub(crate) fn expand_oneline(body: &mut Body, indent: &str, closing: &str) {
    if !body.prefer_oneline() {
        return;
    }

    body.set_prefer_oneline(false);
    body.decor_mut().set_suffix(closing.to_string());
    for mut attribute in body.attributes_mut() {
        attribute.decor_mut().set_prefix(indent.to_string());
        attribute.decor_mut().set_suffix("");
    }
}

/// A new attribute laid out on its own line with `indent`
pub(crate) fn indented_attribute(key: &str, value: Expression, indent: &str) -> Attribute {
    let mut attribute = Attribute::new(Decorated::new(Ident::new(key)), value);
    attribute.decor_mut().set_prefix(indent.to_string());
    attribute
}

/// Utility macro to create [HclDocuments]
///
/// Create from a single document
/// ```
/// # use tf_overwrite::hcl_documents;
/// hcl_documents!("attribute = 42");
/// ```
///
/// Create from multiple documents (path required)
/// ```
/// # use tf_overwrite::hcl_documents;
/// hcl_documents! {
///   "one.tf" => "attribute_one = 1",
///   "two.tf" => "attribute_two = 2"
/// };
/// ```
///
/// # Panic
/// Panics on invalid input
///
/// ```should_panic
/// # use tf_overwrite::hcl_documents;
/// hcl_documents!("not = valid = hcl");
/// ```
#[macro_export]
macro_rules! hcl_documents {
    // single document without source
    { $expr:expr } => {{
        let mut docs = $crate::hcl_documents::HclDocuments::default();
        docs.insert($expr, None).expect("body must parse");
        docs
    }};
    // multi document with sources
    { $($source:expr => $expr:expr),+ } => {{
        let mut docs = $crate::hcl_documents::HclDocuments::default();
        $(
            docs.insert($expr, Some(::std::path::PathBuf::from($source))).expect("body must parse");
        )+

        docs
    }};
}

pub type Source = Option<PathBuf>;
