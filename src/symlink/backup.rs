use crate::error::{Result, SymlinkError};
use crate::symlink::Conversion;
use crate::symlink::operation_context::OperationContext;
use crate::symlink::sidecar;
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// Records the target of the symbolic link at `link` in a `.symlink` file.
///
/// The sidecar is written beside the link, or flattened into the context's
/// output directory. An existing regular sidecar is overwritten; anything
/// else at the sidecar path is reported as [`SymlinkError::PathOccupied`].
///
/// # Returns
///
/// * `Result<Conversion>` - The recorded target and the written sidecar file
pub fn backup_entry(link: &Path, ctx: &OperationContext) -> Result<Conversion> {
    let target = fs::read_link(link).map_err(|source| SymlinkError::LinkRead {
        path: link.to_path_buf(),
        source,
    })?;
    debug!("target: {}", target.display());

    let destination = ctx.relocate(link);
    ensure_parent_dir(&destination)?;

    let sidecar_file = sidecar::sidecar_path(&destination);
    debug!(
        "symlink: {} -> file: {}",
        link.display(),
        sidecar_file.display()
    );

    ensure_writable_sidecar(&sidecar_file)?;
    fs::write(&sidecar_file, sidecar::encode_target(&target))
        .map_err(|e| SymlinkError::io("write sidecar", &sidecar_file, e))?;

    Ok(Conversion {
        target,
        produced: sidecar_file,
    })
}

/// Only a missing path or a regular file may receive sidecar content.
fn ensure_writable_sidecar(sidecar_file: &Path) -> Result<()> {
    match fs::symlink_metadata(sidecar_file) {
        Ok(meta) if meta.file_type().is_file() => Ok(()),
        Ok(_) => Err(SymlinkError::PathOccupied {
            path: sidecar_file.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SymlinkError::io("inspect", sidecar_file, e)),
    }
}

/// Creates the parent directory of `path`, and any missing ancestors.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            debug!("create directory: {}", parent.display());
            fs::create_dir_all(parent).map_err(|e| SymlinkError::io("create directory", parent, e))
        }
        _ => Ok(()),
    }
}
