use std::fs;

use crate::common::types::PathStatus;
use crate::resolver::HostResolver;

use super::lookup::resolve;
use super::map_io_error;

pub fn host_is_symlink(host_path: &str) -> bool {
    if host_path.is_empty() {
        return false;
    }
    fs::symlink_metadata(host_path)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false)
}

pub fn is_symlink<R>(resolver: &R, guest_path: &str) -> bool
where
    R: HostResolver + ?Sized,
{
    host_is_symlink(&resolve(resolver, guest_path))
}

/// Creates a host symlink at `guest_destination` pointing at the resolved
/// `guest_source`.
pub fn create_symlink<R>(
    resolver: &R,
    guest_source: &str,
    guest_destination: &str,
) -> Result<(), PathStatus>
where
    R: HostResolver + ?Sized,
{
    let source = resolve(resolver, guest_source);
    let destination = resolve(resolver, guest_destination);
    if source.is_empty() || destination.is_empty() {
        return Err(PathStatus::NotFound);
    }
    std::os::unix::fs::symlink(&source, &destination).map_err(|err| {
        log::debug!("symlink {destination} -> {source} failed: {err}");
        map_io_error(&err)
    })
}
