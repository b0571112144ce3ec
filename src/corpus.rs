//! Corpus lifecycle: create and remove `<root>/file-<index>`

use std::fs::OpenOptions;
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use crate::buffers::{CName, PATH_CAPACITY};
use crate::config::RunConfig;
use crate::error::{BenchError, Result};
use crate::phase::Phase;

/// File name stem of every corpus entry
pub const ENTRY_STEM: &[u8] = b"file-";

/// Permission bits of created entries
pub const ENTRY_MODE: u32 = 0o644;

/// Path of corpus entry `index` (1-based, no zero padding)
#[cfg(test)]
pub(crate) fn entry_path(root: &Path, index: usize) -> PathBuf {
    let mut path = root.as_os_str().to_owned();
    path.push(format!("/file-{}", index));
    PathBuf::from(path)
}

/// Print `<label>: <path>` for every `nth` entry
pub(crate) fn report_progress(phase: Phase, index: usize, nth: usize, path: &CName) {
    if nth != 0 && index % nth == 0 {
        println!("{}: {}", phase.label(), path.display());
    }
}

/// Remove a path, treating "does not exist" as success
fn remove_if_present(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Creates and removes the synthetic file set
#[derive(Debug)]
pub struct Corpus<'a> {
    config: &'a RunConfig,
}

impl<'a> Corpus<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self { config }
    }

    /// Recreate entries `1..=files` as empty regular files
    ///
    /// Stale entries from an earlier run are removed first. Stops at the
    /// first failure.
    pub fn populate(&self) -> Result<()> {
        let mut path = CName::acquire("file name", PATH_CAPACITY)?;

        for index in 1..=self.config.files {
            path.set_joined(&self.config.path, ENTRY_STEM, index);
            report_progress(Phase::Create, index, self.config.nth, &path);

            remove_if_present(path.as_path())
                .map_err(|e| BenchError::io("unlink", path.as_path(), e))?;

            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(ENTRY_MODE)
                .open(path.as_path())
                .map_err(|e| BenchError::io("open", path.as_path(), e))?;
        }

        tracing::debug!(files = self.config.files, "corpus created");
        Ok(())
    }

    /// Remove entries `1..=files`; already-absent entries are skipped
    pub fn teardown(&self) -> Result<()> {
        let mut path = CName::acquire("file name", PATH_CAPACITY)?;

        for index in 1..=self.config.files {
            path.set_joined(&self.config.path, ENTRY_STEM, index);
            report_progress(Phase::Teardown, index, self.config.nth, &path);

            remove_if_present(path.as_path())
                .map_err(|e| BenchError::io("unlink", path.as_path(), e))?;
        }

        tracing::debug!(files = self.config.files, "corpus removed");
        Ok(())
    }
}
