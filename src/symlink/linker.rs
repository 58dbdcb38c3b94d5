use crate::error::{Result, SymlinkError};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// What a restored link points at once its target has been detected or created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    File,
    Directory,
}

/// Creates the symbolic link `link` pointing at `target`, exactly as stored.
pub trait LinkCreator {
    fn create_link(&self, target: &Path, link: &Path, kind: TargetKind) -> Result<()>;
}

/// Uses the operating system's symlink call for every kind of target.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeLinker;

impl LinkCreator for NativeLinker {
    fn create_link(&self, target: &Path, link: &Path, kind: TargetKind) -> Result<()> {
        debug!("use native symlink call");
        native_symlink(target, link, kind)
            .map_err(|e| SymlinkError::io("create symbolic link", link, e))
    }
}

/// Links directories through `cmd.exe /c mklink /d`, files through the native call.
///
/// Used where native directory symlinks are restricted.
#[derive(Debug, Default, Clone, Copy)]
pub struct MklinkLinker;

impl LinkCreator for MklinkLinker {
    fn create_link(&self, target: &Path, link: &Path, kind: TargetKind) -> Result<()> {
        if kind == TargetKind::File {
            return NativeLinker.create_link(target, link, kind);
        }

        let mut cmd = mklink_command(target, link);
        let command = format!("{:?}", cmd);
        debug!("exec: {}", command);

        let status = cmd
            .status()
            .map_err(|e| SymlinkError::io("run mklink for", link, e))?;
        if !status.success() {
            return Err(SymlinkError::LinkCommand {
                command,
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

/// Picks the link strategy for the platform this process runs on.
pub fn for_current_platform() -> Box<dyn LinkCreator> {
    if cfg!(windows) {
        Box::new(MklinkLinker)
    } else {
        Box::new(NativeLinker)
    }
}

fn mklink_command(target: &Path, link: &Path) -> Command {
    let mut cmd = Command::new("cmd.exe");
    cmd.args(["/c", "mklink", "/d"])
        .arg(link)
        .arg(target)
        .stdout(Stdio::null())
        .stderr(Stdio::inherit());
    cmd
}

#[cfg(unix)]
fn native_symlink(target: &Path, link: &Path, _kind: TargetKind) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn native_symlink(target: &Path, link: &Path, kind: TargetKind) -> std::io::Result<()> {
    match kind {
        TargetKind::File => std::os::windows::fs::symlink_file(target, link),
        TargetKind::Directory => std::os::windows::fs::symlink_dir(target, link),
    }
}

#[cfg(not(any(unix, windows)))]
fn native_symlink(_target: &Path, _link: &Path, _kind: TargetKind) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}
