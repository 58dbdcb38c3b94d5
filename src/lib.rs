pub mod error;
pub mod symlink;
