//! Naming and content rules for `.symlink` sidecar files.
//!
//! A sidecar is named `<link-name>.symlink` and holds the raw bytes of the
//! link's target, with no header, newline or escaping.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Suffix appended to a link's name to form its sidecar file name.
pub const SUFFIX: &str = ".symlink";

/// True if the final component of `path` ends with [`SUFFIX`].
pub fn has_sidecar_suffix(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.as_encoded_bytes().ends_with(SUFFIX.as_bytes()))
}

/// `<link>.symlink`
pub fn sidecar_path(link: &Path) -> PathBuf {
    let mut name = OsString::from(link.as_os_str());
    name.push(SUFFIX);
    PathBuf::from(name)
}

/// Strips [`SUFFIX`] from the sidecar's name.
///
/// Returns `None` when the name lacks the suffix or nothing is left once it is removed.
pub fn link_path(sidecar: &Path) -> Option<PathBuf> {
    let name = sidecar.file_name()?;
    let stem = strip_suffix(name)?;
    if stem.is_empty() {
        return None;
    }
    Some(sidecar.with_file_name(stem))
}

#[cfg(unix)]
fn strip_suffix(name: &OsStr) -> Option<&OsStr> {
    use std::os::unix::ffi::OsStrExt;

    name.as_bytes()
        .strip_suffix(SUFFIX.as_bytes())
        .map(OsStr::from_bytes)
}

#[cfg(not(unix))]
fn strip_suffix(name: &OsStr) -> Option<&OsStr> {
    name.to_str()?.strip_suffix(SUFFIX).map(OsStr::new)
}

/// Bytes written to a sidecar for a link pointing at `target`.
#[cfg(unix)]
pub fn encode_target(target: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;

    target.as_os_str().as_bytes().to_vec()
}

#[cfg(not(unix))]
pub fn encode_target(target: &Path) -> Vec<u8> {
    target.to_string_lossy().into_owned().into_bytes()
}

/// Link target stored in a sidecar's content.
///
/// Any byte sequence is accepted on unix. Elsewhere the content must be UTF-8.
#[cfg(unix)]
pub fn decode_target(bytes: Vec<u8>) -> Option<PathBuf> {
    use std::os::unix::ffi::OsStringExt;

    Some(PathBuf::from(OsString::from_vec(bytes)))
}

#[cfg(not(unix))]
pub fn decode_target(bytes: Vec<u8>) -> Option<PathBuf> {
    String::from_utf8(bytes).ok().map(PathBuf::from)
}
