use crate::error::{Result, SymlinkError};
use std::env;
use std::path::{Path, PathBuf};

/// Direction of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Read live symbolic links and write `.symlink` files.
    Backup,
    /// Read `.symlink` files and recreate the symbolic links.
    Restore,
}

/// Resolved configuration for one invocation. Built once, never mutated by a run.
#[derive(Debug, Clone)]
pub struct OperationContext {
    /// Whether links are backed up or restored
    pub mode: Mode,
    /// Absolute path of the directory or single entry to process
    pub source_path: PathBuf,
    /// When set, results are written here using only the base name of each entry
    pub output_dir: Option<PathBuf>,
    /// When restoring, create a missing link target as a directory instead of an empty file
    pub create_missing_as_directory: bool,
    /// Directory relative link targets are resolved against when no output directory is set
    pub working_dir: PathBuf,
}

impl OperationContext {
    /// Creates a context for `source_path`, resolved against the process working directory.
    pub fn new(mode: Mode, source_path: impl AsRef<Path>) -> Result<Self> {
        let working_dir =
            env::current_dir().map_err(|e| SymlinkError::io("read working directory", ".", e))?;
        let source_path = absolute_from(&working_dir, source_path.as_ref());

        Ok(Self {
            mode,
            source_path,
            output_dir: None,
            create_missing_as_directory: false,
            working_dir,
        })
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir.filter(|dir| !dir.as_os_str().is_empty());
        self
    }

    pub fn with_create_missing_as_directory(mut self, enabled: bool) -> Self {
        self.create_missing_as_directory = enabled;
        self
    }

    pub fn with_working_dir(mut self, working_dir: impl Into<PathBuf>) -> Self {
        self.working_dir = working_dir.into();
        self
    }

    /// Where an entry named like `entry` ends up: beside it, or flattened into the output directory.
    pub fn relocate(&self, entry: &Path) -> PathBuf {
        match (&self.output_dir, entry.file_name()) {
            (Some(dir), Some(name)) => dir.join(name),
            _ => entry.to_path_buf(),
        }
    }
}

fn absolute_from(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
