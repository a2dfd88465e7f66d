use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::common::types::PathStatus;
use crate::resolver::HostResolver;

use super::lookup::resolve_guest_path;
use super::map_io_error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovalReport {
    /// Files, symlinks and other non-directories unlinked.
    pub files_unlinked: usize,
    pub dirs_removed: usize,
    /// Entries that could not be listed, typed or removed.
    pub entries_skipped: usize,
}

/// Removes `root` and everything below it without recursion.
///
/// A `root` that is a symlink or any other non-directory is unlinked on its
/// own. Otherwise directories are discovered breadth-first; every
/// non-directory (symlinks included, whatever they point at) is unlinked as
/// it is found. Directories are then removed in reverse discovery order, so
/// each one is empty by the time `rmdir` reaches it. Failures are counted
/// and skipped.
pub fn remove_tree(root: &Path) -> RemovalReport {
    let mut report = RemovalReport::default();
    let root_meta = match fs::symlink_metadata(root) {
        Ok(meta) => meta,
        Err(err) => {
            log::debug!("cannot stat {}: {err}", root.display());
            report.entries_skipped += 1;
            return report;
        }
    };
    if !root_meta.is_dir() {
        match fs::remove_file(root) {
            Ok(()) => report.files_unlinked += 1,
            Err(err) => {
                log::debug!("cannot unlink {}: {err}", root.display());
                report.entries_skipped += 1;
            }
        }
        return report;
    }

    let mut pending: VecDeque<PathBuf> = VecDeque::new();
    let mut removal_order: Vec<PathBuf> = Vec::new();
    pending.push_back(root.to_path_buf());
    removal_order.push(root.to_path_buf());

    while let Some(dir) = pending.pop_front() {
        // read_dir never yields `.` or `..`.
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                log::debug!("skipping unreadable directory {}: {err}", dir.display());
                report.entries_skipped += 1;
                continue;
            }
        };
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::debug!("skipping entry in {}: {err}", dir.display());
                    report.entries_skipped += 1;
                    continue;
                }
            };
            let path = entry.path();
            // DirEntry::file_type does not follow symlinks.
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(err) => {
                    log::debug!("cannot stat {}: {err}", path.display());
                    report.entries_skipped += 1;
                    continue;
                }
            };
            if file_type.is_dir() {
                pending.push_back(path.clone());
                removal_order.push(path);
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => report.files_unlinked += 1,
                Err(err) => {
                    log::debug!("cannot unlink {}: {err}", path.display());
                    report.entries_skipped += 1;
                }
            }
        }
    }

    while let Some(dir) = removal_order.pop() {
        match fs::remove_dir(&dir) {
            Ok(()) => report.dirs_removed += 1,
            Err(err) => {
                log::debug!("cannot remove directory {}: {err}", dir.display());
                report.entries_skipped += 1;
            }
        }
    }

    report
}

/// Deletes whatever sits at `host_path`: a symlink or file is unlinked, a
/// real directory is removed together with its subtree.
///
/// Succeeds when nothing is left at `host_path`, even if parts of the
/// subtree were skipped along the way.
pub fn delete_host_path(host_path: &str) -> Result<RemovalReport, PathStatus> {
    if host_path.is_empty() {
        return Err(PathStatus::InvalidPath);
    }
    let path = Path::new(host_path);
    let meta = fs::symlink_metadata(path).map_err(|err| {
        log::debug!("delete target {host_path} not found: {err}");
        PathStatus::NotFound
    })?;

    if !meta.is_dir() {
        fs::remove_file(path).map_err(|err| map_io_error(&err))?;
        return Ok(RemovalReport {
            files_unlinked: 1,
            ..RemovalReport::default()
        });
    }

    let mut report = remove_tree(path);
    match fs::symlink_metadata(path) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(report),
        Err(err) => Err(map_io_error(&err)),
        Ok(_) => {
            log::warn!(
                "{host_path} survived tree removal ({} entries skipped)",
                report.entries_skipped
            );
            // One more attempt, to report why the top level is still there.
            fs::remove_dir(path).map_err(|err| map_io_error(&err))?;
            report.dirs_removed += 1;
            Ok(report)
        }
    }
}

/// Resolves `guest_path` and deletes the host entry behind it.
///
/// Only anchored results are deleted; a bare relative tail would be taken
/// relative to the process working directory.
pub fn delete_path<R>(resolver: &R, guest_path: &str) -> Result<RemovalReport, PathStatus>
where
    R: HostResolver + ?Sized,
{
    let resolution = resolve_guest_path(resolver, guest_path);
    if !resolution.is_anchored() {
        if resolution.is_resolved() {
            log::debug!(
                "refusing to delete unanchored '{}' for '{guest_path}'",
                resolution.host_path
            );
        }
        return Err(PathStatus::NotFound);
    }
    let host_path = resolution.host_path;
    let report = delete_host_path(&host_path)?;
    log::debug!(
        "deleted {host_path}: {} files, {} directories, {} skipped",
        report.files_unlinked,
        report.dirs_removed,
        report.entries_skipped
    );
    Ok(report)
}
