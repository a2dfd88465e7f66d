pub mod callback;
pub mod canonical;
pub mod drive_map;
pub mod lookup;
pub mod parser;
pub mod remove;
pub mod symlink;

use std::io;

use crate::common::types::PathStatus;

pub use callback::CallbackResolver;
pub use drive_map::{DriveMapConfig, DriveMapResolver};
pub use lookup::{resolve, resolve_guest_path, Resolution};
pub use remove::{delete_host_path, delete_path, remove_tree, RemovalReport};
pub use symlink::{create_symlink, host_is_symlink, is_symlink};

pub(crate) fn map_io_error(err: &io::Error) -> PathStatus {
    use io::ErrorKind;
    if err.raw_os_error() == Some(libc::ELOOP) {
        return PathStatus::TooManySymlinks;
    }
    match err.kind() {
        ErrorKind::NotFound => PathStatus::NotFound,
        ErrorKind::PermissionDenied => PathStatus::PermissionDenied,
        ErrorKind::AlreadyExists => PathStatus::Exists,
        ErrorKind::InvalidInput => PathStatus::InvalidPath,
        ErrorKind::NotADirectory => PathStatus::NotADirectory,
        _ => PathStatus::IoError,
    }
}
