use crate::common::types::*;
use crate::host::drive_map::{DriveMapConfig, DriveMapResolver};
use crate::host::parser::drive_letter;
use crate::host::{self, CallbackResolver};
use crate::logging;
use crate::resolver::HostResolver;

use core::ffi::{c_char, c_int, c_void};
use std::ffi::CStr;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

// Configuration only; never held across filesystem calls.
static HOST_RESOLVER: RwLock<Option<Arc<dyn HostResolver>>> = RwLock::new(None);

fn active_resolver() -> Arc<dyn HostResolver> {
    let installed = HOST_RESOLVER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    match installed {
        Some(resolver) => resolver,
        None => Arc::new(DriveMapResolver::default()),
    }
}

fn install_resolver(resolver: Option<Arc<dyn HostResolver>>) {
    *HOST_RESOLVER.write().unwrap_or_else(PoisonError::into_inner) = resolver;
}

/// Null or non-UTF-8 input reads as the empty guest path.
unsafe fn guest_path_arg<'a>(ptr: *const c_char) -> &'a str {
    if ptr.is_null() {
        return "";
    }
    CStr::from_ptr(ptr).to_str().unwrap_or_else(|_| {
        log::debug!("guest path is not valid UTF-8");
        ""
    })
}

unsafe fn string_view_to_str<'a>(view: &StringView) -> Result<&'a str, PathStatus> {
    if view.len == 0 {
        return Ok("");
    }
    if view.ptr.is_null() {
        return Err(PathStatus::InvalidPath);
    }
    let bytes = std::slice::from_raw_parts(view.ptr as *const u8, view.len);
    std::str::from_utf8(bytes).map_err(|_| PathStatus::EncodingError)
}

/// Copies as much of `value` as fits and always NUL-terminates. Returns true
/// when nothing was cut off.
fn write_c_buffer(value: &str, out: &mut [u8]) -> bool {
    let Some(room) = out.len().checked_sub(1) else {
        return false;
    };
    let bytes = value.as_bytes();
    let count = bytes.len().min(room);
    out[..count].copy_from_slice(&bytes[..count]);
    out[count] = 0;
    count == bytes.len()
}

/// Resolve a guest path and write the host path into `buffer`.
///
/// Returns false when the result is empty or did not fit; a result that
/// did not fit is still written, truncated to `buffer_size - 1` bytes.
///
/// # Safety
/// - `path` must be null or a valid NUL-terminated string
/// - `buffer` must be null or writable for `buffer_size` bytes
#[no_mangle]
pub unsafe extern "C" fn guestpath_convert_path(
    path: *const c_char,
    buffer: *mut c_char,
    buffer_size: c_int,
) -> bool {
    let guest = guest_path_arg(path);
    let resolver = active_resolver();
    let host_path = host::resolve(resolver.as_ref(), guest);

    if buffer.is_null() || buffer_size <= 0 {
        return false;
    }
    let out = std::slice::from_raw_parts_mut(buffer as *mut u8, buffer_size as usize);
    let complete = write_c_buffer(&host_path, out);
    if !complete {
        log::debug!(
            "host path for '{guest}' needs {} bytes, buffer holds {buffer_size}",
            host_path.len() + 1
        );
    }
    complete && !host_path.is_empty()
}

/// # Safety
/// `path` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn guestpath_is_symlink(path: *const c_char) -> bool {
    let guest = guest_path_arg(path);
    let resolver = active_resolver();
    host::is_symlink(resolver.as_ref(), guest)
}

/// Delete the file, symlink or directory tree behind a guest path.
///
/// # Safety
/// `path` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn guestpath_delete_path(path: *const c_char) -> bool {
    let guest = guest_path_arg(path);
    let resolver = active_resolver();
    match host::delete_path(resolver.as_ref(), guest) {
        Ok(_) => true,
        Err(status) => {
            log::warn!("delete of '{guest}' failed: {status:?}");
            false
        }
    }
}

/// Create a symlink at `destination` pointing at `source`.
///
/// # Safety
/// Both pointers must be null or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn guestpath_create_symlink(
    source: *const c_char,
    destination: *const c_char,
) -> bool {
    let source = guest_path_arg(source);
    let destination = guest_path_arg(destination);
    let resolver = active_resolver();
    match host::create_symlink(resolver.as_ref(), source, destination) {
        Ok(()) => true,
        Err(status) => {
            log::warn!("symlink '{destination}' -> '{source}' failed: {status:?}");
            false
        }
    }
}

/// Install a drive table as the active resolver. A null `mapping` installs
/// an empty table.
///
/// # Safety
/// `mapping` must be null or point to a `DriveMapping` whose entries and
/// string views are valid for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn guestpath_set_drive_mapping(
    mapping: *const DriveMapping,
    flags: u32,
) -> PathStatus {
    let mut config = DriveMapConfig {
        case_insensitive: flags & GUESTPATH_FLAG_CASE_SENSITIVE == 0,
        ..DriveMapConfig::default()
    };

    if let Some(mapping) = mapping.as_ref() {
        if mapping.entries.is_null() && mapping.len != 0 {
            return PathStatus::InvalidPath;
        }
        let entries: &[DriveMappingEntry] = if mapping.len == 0 {
            &[][..]
        } else {
            std::slice::from_raw_parts(mapping.entries, mapping.len)
        };
        for entry in entries {
            let drive = match string_view_to_str(&entry.drive) {
                Ok(value) => value,
                Err(status) => return status,
            };
            let root = match string_view_to_str(&entry.root) {
                Ok(value) => value,
                Err(status) => return status,
            };
            let Some(letter) = drive_letter(drive) else {
                log::warn!("rejecting drive mapping key '{drive}'");
                return PathStatus::InvalidPath;
            };
            if root.is_empty() {
                return PathStatus::InvalidPath;
            }
            config.drives.insert(letter, PathBuf::from(root));
        }
    }

    log::info!(
        "installing drive table with {} drives (case-insensitive: {})",
        config.drives.len(),
        config.case_insensitive
    );
    install_resolver(Some(Arc::new(DriveMapResolver::new(config))));
    PathStatus::Ok
}

/// Route lookups through an embedder-supplied host primitive. A `None`
/// callback restores the default resolver.
#[no_mangle]
pub extern "C" fn guestpath_set_resolver_callback(
    callback: HostResolveCallback,
    user_data: *mut c_void,
) -> PathStatus {
    match CallbackResolver::new(callback, user_data) {
        Some(resolver) => install_resolver(Some(Arc::new(resolver))),
        None => install_resolver(None),
    }
    PathStatus::Ok
}

#[no_mangle]
pub extern "C" fn guestpath_reset_resolver() -> PathStatus {
    install_resolver(None);
    PathStatus::Ok
}

#[no_mangle]
pub extern "C" fn guestpath_log_set_stderr(level: LogLevel) -> PathStatus {
    logging::log_set_stderr(level)
}

#[no_mangle]
pub extern "C" fn guestpath_log_set_callback(
    callback: LogCallback,
    user_data: *mut c_void,
    level: LogLevel,
) -> PathStatus {
    logging::log_set_callback(callback, user_data, level)
}

#[no_mangle]
pub extern "C" fn guestpath_log_set_level(level: LogLevel) -> PathStatus {
    logging::log_set_level(level)
}

#[no_mangle]
pub extern "C" fn guestpath_log_disable() -> PathStatus {
    logging::log_disable()
}
