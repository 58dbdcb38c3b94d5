use crate::error::{Result, SymlinkError};
use crate::symlink::Conversion;
use crate::symlink::backup::ensure_parent_dir;
use crate::symlink::linker::{LinkCreator, TargetKind};
use crate::symlink::operation_context::OperationContext;
use crate::symlink::sidecar;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Recreates the symbolic link recorded in the `.symlink` file at `sidecar_file`.
///
/// A stale symbolic link at the destination is replaced. Anything else there
/// is left untouched and reported as [`SymlinkError::PathOccupied`]. A missing
/// link target is materialized first so the new link never dangles.
///
/// # Arguments
///
/// * `sidecar_file` - The `.symlink` file to read
/// * `ctx` - Output directory and target materialization settings
/// * `linker` - Platform strategy used to create the link
///
/// # Returns
///
/// * `Result<Conversion>` - The stored target and the created symbolic link
pub fn restore_entry(
    sidecar_file: &Path,
    ctx: &OperationContext,
    linker: &dyn LinkCreator,
) -> Result<Conversion> {
    let content =
        fs::read(sidecar_file).map_err(|e| SymlinkError::io("read sidecar", sidecar_file, e))?;
    let target = sidecar::decode_target(content)
        .filter(|target| !target.as_os_str().is_empty())
        .ok_or_else(|| SymlinkError::InvalidTarget {
            path: sidecar_file.to_path_buf(),
        })?;
    debug!("target: {}", target.display());

    let link = sidecar::link_path(sidecar_file).ok_or_else(|| SymlinkError::InvalidEntry {
        path: sidecar_file.to_path_buf(),
    })?;
    let link = ctx.relocate(&link);
    debug!(
        "file: {} -> symlink: {}",
        sidecar_file.display(),
        link.display()
    );

    ensure_parent_dir(&link)?;
    clear_stale_link(&link)?;

    let resolved = resolve_target(&target, ctx);
    debug!(
        "absolute path of target {}: {}",
        target.display(),
        resolved.display()
    );

    let kind = materialize_target(&resolved, ctx.create_missing_as_directory)?;
    debug!("link as {:?}", kind);

    linker.create_link(&target, &link, kind)?;
    Ok(Conversion {
        target,
        produced: link,
    })
}

/// Absolute location used to detect or create the link's target.
///
/// Absolute targets are used as stored. A relative target is taken by base
/// name into the output directory when one is set, otherwise it is joined
/// onto the working directory.
pub fn resolve_target(target: &Path, ctx: &OperationContext) -> PathBuf {
    if target.is_absolute() {
        return target.to_path_buf();
    }

    match &ctx.output_dir {
        Some(dir) => match target.file_name() {
            Some(name) => dir.join(name),
            None => dir.join(target),
        },
        None => ctx.working_dir.join(target),
    }
}

/// Detects what lives at `path`, creating an empty directory or file when nothing does.
pub fn materialize_target(path: &Path, create_missing_as_directory: bool) -> Result<TargetKind> {
    match fs::metadata(path) {
        Ok(meta) => {
            let kind = if meta.is_dir() {
                TargetKind::Directory
            } else {
                TargetKind::File
            };
            debug!("detect target {} as {:?}", path.display(), kind);
            Ok(kind)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            if create_missing_as_directory {
                debug!("create target as directory: {}", path.display());
                fs::create_dir_all(path)
                    .map_err(|e| SymlinkError::io("create target directory", path, e))?;
                Ok(TargetKind::Directory)
            } else {
                debug!("create target as file: {}", path.display());
                OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(false)
                    .open(path)
                    .map_err(|e| SymlinkError::io("create target file", path, e))?;
                Ok(TargetKind::File)
            }
        }
        Err(e) => Err(SymlinkError::io("inspect target", path, e)),
    }
}

/// Removes a symbolic link already at `link`; refuses to touch anything else.
fn clear_stale_link(link: &Path) -> Result<()> {
    match fs::symlink_metadata(link) {
        Ok(meta) if meta.file_type().is_symlink() => {
            debug!("delete existing symlink: {}", link.display());
            remove_link(link).map_err(|e| SymlinkError::io("remove existing symlink", link, e))
        }
        Ok(_) => Err(SymlinkError::PathOccupied {
            path: link.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SymlinkError::io("inspect", link, e)),
    }
}

#[cfg(not(windows))]
fn remove_link(link: &Path) -> io::Result<()> {
    fs::remove_file(link)
}

// Directory symlinks are removed as directories on Windows.
#[cfg(windows)]
fn remove_link(link: &Path) -> io::Result<()> {
    fs::remove_file(link).or_else(|_| fs::remove_dir(link))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symlink::operation_context::Mode;

    fn context() -> OperationContext {
        OperationContext::new(Mode::Restore, ".")
            .unwrap()
            .with_working_dir(Path::new("/work"))
    }

    #[test]
    fn test_resolve_relative_against_working_dir() {
        let ctx = context();
        assert_eq!(
            resolve_target(Path::new("shared/data"), &ctx),
            Path::new("/work").join("shared/data")
        );
    }

    #[test]
    fn test_resolve_relative_into_output_dir_by_base_name() {
        let ctx = context().with_output_dir(Some(PathBuf::from("/out")));
        assert_eq!(
            resolve_target(Path::new("../shared/data"), &ctx),
            Path::new("/out").join("data")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_absolute_unchanged() {
        let ctx = context().with_output_dir(Some(PathBuf::from("/out")));
        assert_eq!(
            resolve_target(Path::new("/data/shared"), &ctx),
            PathBuf::from("/data/shared")
        );
    }

    #[test]
    fn test_materialize_detects_existing_kind() -> Result<()> {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("file.txt");
        fs::write(&file, b"keep").unwrap();

        assert_eq!(materialize_target(tmp.path(), false)?, TargetKind::Directory);
        assert_eq!(materialize_target(&file, true)?, TargetKind::File);
        assert_eq!(fs::read(&file).unwrap(), b"keep");
        Ok(())
    }
}
