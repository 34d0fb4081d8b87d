use std::io::Write;
use std::path::{Path, PathBuf};

/// File contents waiting to be written
#[derive(derive_new::new, Debug, Clone, PartialEq, Eq)]
pub struct StagedWrite {
    pub path: PathBuf,
    pub contents: String,
}

/// Batch of pending writes
///
/// Rewriters validate everything in memory and only [flush](StagedWrites::flush) once all checks passed, so a failed
/// call leaves the directory as it was.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StagedWrites {
    writes: Vec<StagedWrite>,
}

impl StagedWrites {
    pub fn push(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        let write = StagedWrite::new(path.into(), contents.into());
        tracing::trace!(path=%write.path.display(), "staged write");
        self.writes.push(write);
    }

    pub fn iter(&self) -> impl Iterator<Item = &StagedWrite> {
        self.writes.iter()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Writes every staged file
    ///
    /// All contents are first written to temporary files next to their targets, which are then renamed into place.
    /// A failure while writing leaves every target untouched. Existing targets keep their permissions.
    pub fn flush(self) -> std::io::Result<()> {
        let mut prepared = Vec::with_capacity(self.writes.len());
        for write in self.writes {
            let temp = write_temp(&write)?;
            prepared.push((temp, write.path));
        }

        for (temp, path) in prepared {
            temp.persist(&path).map_err(|err| err.error)?;
            tracing::info!(path=%path.display(), "file written");
        }

        Ok(())
    }
}

fn write_temp(write: &StagedWrite) -> std::io::Result<tempfile::NamedTempFile> {
    let dir = match write.path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(write.contents.as_bytes())?;
    temp.as_file().sync_all()?;

    match std::fs::metadata(&write.path) {
        Ok(metadata) => temp.as_file().set_permissions(metadata.permissions())?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }

    Ok(temp)
}

/// Reads a file that is allowed to be missing
pub(crate) fn read_optional(path: &Path) -> std::io::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Follows a chain of mapping keys
pub(crate) fn yaml_path_mut<'a>(
    mut value: &'a mut serde_yaml::Value,
    path: &[&str],
) -> Option<&'a mut serde_yaml::Value> {
    for key in path {
        value = value.get_mut(*key)?;
    }

    Some(value)
}
