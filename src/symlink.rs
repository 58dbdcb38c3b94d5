pub mod backup;
pub mod linker;
pub mod operation_context;
pub mod restore;
pub mod sidecar;


use crate::error::{Result, SymlinkError};
use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

pub use backup::backup_entry;
pub use linker::{LinkCreator, TargetKind};
pub use operation_context::{Mode, OperationContext};
pub use restore::restore_entry;

/// Outcome of converting one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Link target, exactly as read from the link or the sidecar
    pub target: PathBuf,
    /// Sidecar file written on backup, symbolic link created on restore
    pub produced: PathBuf,
}

/// Backs up or restores everything the context's source path names.
///
/// A directory (that is not itself a symbolic link) is processed in batch:
/// each immediate child that qualifies for the mode is converted, in file name
/// order. Anything else is treated as a single entry.
///
/// # Returns
///
/// * `Result<Vec<PathBuf>>` - Sidecar files written, or links created, in order
pub fn run(ctx: &OperationContext, linker: &dyn LinkCreator) -> Result<Vec<PathBuf>> {
    let root = ctx.source_path.as_path();
    let meta = fs::symlink_metadata(root).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SymlinkError::PathNotFound {
            path: root.to_path_buf(),
        },
        _ => SymlinkError::io("inspect", root, e),
    })?;

    // symlink_metadata never reports a symbolic link as a directory
    if meta.is_dir() {
        walk_directory(root, ctx, linker)
    } else {
        convert_single(root, &meta, ctx, linker).map(|produced| vec![produced])
    }
}

/// Converts the qualifying immediate children of `dir`, stopping at the first failure.
///
/// Backup picks symbolic links, restore picks regular files ending in `.symlink`;
/// everything else is skipped. Subdirectories are not descended into.
pub fn walk_directory(
    dir: &Path,
    ctx: &OperationContext,
    linker: &dyn LinkCreator,
) -> Result<Vec<PathBuf>> {
    let mut produced = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| SymlinkError::io("list directory", dir, io::Error::from(e)))?;
        let path = entry.path();
        let file_type = entry.file_type();

        let qualifies = match ctx.mode {
            Mode::Backup => file_type.is_symlink(),
            Mode::Restore => file_type.is_file() && sidecar::has_sidecar_suffix(path),
        };
        if qualifies {
            produced.push(convert(path, ctx, linker)?);
        }
    }

    if produced.is_empty() {
        warn!("no symbolic links found in directory: {}", dir.display());
    }

    Ok(produced)
}

fn convert_single(
    path: &Path,
    meta: &Metadata,
    ctx: &OperationContext,
    linker: &dyn LinkCreator,
) -> Result<PathBuf> {
    match ctx.mode {
        Mode::Backup if !meta.file_type().is_symlink() => Err(SymlinkError::NotASymlink {
            path: path.to_path_buf(),
        }),
        Mode::Restore if !(meta.is_file() && sidecar::has_sidecar_suffix(path)) => {
            Err(SymlinkError::InvalidEntry {
                path: path.to_path_buf(),
            })
        }
        _ => convert(path, ctx, linker),
    }
}

/// Runs the converter for the context's mode and logs the outcome.
fn convert(path: &Path, ctx: &OperationContext, linker: &dyn LinkCreator) -> Result<PathBuf> {
    let conversion = match ctx.mode {
        Mode::Backup => backup_entry(path, ctx)?,
        Mode::Restore => restore_entry(path, ctx, linker)?,
    };

    match ctx.mode {
        Mode::Backup => info!(
            "backup: symlink: {}; target: {}; file: {}",
            path.display(),
            conversion.target.display(),
            conversion.produced.display()
        ),
        Mode::Restore => info!(
            "restore: file: {}; target: {}; symlink: {}",
            path.display(),
            conversion.target.display(),
            conversion.produced.display()
        ),
    }

    Ok(conversion.produced)
}
