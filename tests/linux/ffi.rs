use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use guestpath::{
    guestpath_convert_path, guestpath_create_symlink, guestpath_delete_path, guestpath_is_symlink,
    guestpath_reset_resolver, guestpath_set_drive_mapping, guestpath_set_resolver_callback,
    DriveMapping, DriveMappingEntry, PathStatus, StringView, GUESTPATH_FLAG_CASE_SENSITIVE,
};

// The active resolver is process-wide.
static RESOLVER_MUTEX: Mutex<()> = Mutex::new(());

struct ResolverGuard {
    _lock: MutexGuard<'static, ()>,
}

impl Drop for ResolverGuard {
    fn drop(&mut self) {
        guestpath_reset_resolver();
    }
}

fn exclusive() -> ResolverGuard {
    let lock = RESOLVER_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
    guestpath_reset_resolver();
    ResolverGuard { _lock: lock }
}

fn view(value: &str) -> StringView {
    StringView {
        ptr: value.as_ptr() as *const c_char,
        len: value.len(),
    }
}

fn map_drive(drive: &str, root: &str, flags: u32) -> PathStatus {
    let entries = [DriveMappingEntry {
        drive: view(drive),
        root: view(root),
    }];
    let mapping = DriveMapping {
        entries: entries.as_ptr(),
        len: entries.len(),
    };
    unsafe { guestpath_set_drive_mapping(&mapping, flags) }
}

fn canonical_temp() -> (tempfile::TempDir, PathBuf) {
    let temp = tempfile::tempdir().expect("create temp dir");
    let root = fs::canonicalize(temp.path()).expect("canonicalize temp dir");
    (temp, root)
}

fn convert(guest: &str, capacity: usize) -> (bool, Vec<u8>) {
    let guest = CString::new(guest).unwrap();
    let mut buffer = vec![0xAAu8; capacity];
    let ok = unsafe {
        guestpath_convert_path(
            guest.as_ptr(),
            buffer.as_mut_ptr() as *mut c_char,
            capacity as c_int,
        )
    };
    (ok, buffer)
}

fn c_text(buffer: &[u8]) -> &str {
    CStr::from_bytes_until_nul(buffer)
        .expect("terminated output")
        .to_str()
        .unwrap()
}

#[test]
fn convert_path_buffer_contract() {
    let _guard = exclusive();
    let (_temp, root) = canonical_temp();
    assert_eq!(map_drive("c:", root.to_str().unwrap(), 0), PathStatus::Ok);

    let expected = format!("{}/windows/system32", root.display());
    let len = expected.len();

    let (ok, buffer) = convert("C:\\windows\\system32", len + 1);
    assert!(ok);
    assert_eq!(c_text(&buffer), expected);

    let (ok, buffer) = convert("C:\\windows\\system32", len);
    assert!(!ok);
    assert_eq!(c_text(&buffer), &expected[..len - 1]);

    let (ok, buffer) = convert("C:\\windows\\system32", 4);
    assert!(!ok);
    assert_eq!(&buffer, format!("{}\0", &expected[..3]).as_bytes());

    let (ok, buffer) = convert("C:\\windows\\system32", 0);
    assert!(!ok);
    assert!(buffer.is_empty());
}

#[test]
fn drive_root_converts() {
    let _guard = exclusive();
    let (_temp, root) = canonical_temp();
    assert_eq!(map_drive("c:", root.to_str().unwrap(), 0), PathStatus::Ok);

    for guest in ["C:\\", "c:"] {
        let (ok, buffer) = convert(guest, 512);
        assert!(ok, "guest path {guest:?}");
        assert_eq!(c_text(&buffer), root.to_str().unwrap());
    }
}

#[test]
fn convert_path_rejects_null_and_empty_input() {
    let _guard = exclusive();
    let mut buffer = [0xAAu8; 16];
    let ok = unsafe {
        guestpath_convert_path(std::ptr::null(), buffer.as_mut_ptr() as *mut c_char, 16)
    };
    assert!(!ok);
    assert_eq!(buffer[0], 0);

    let (ok, buffer) = convert("", 16);
    assert!(!ok);
    assert_eq!(c_text(&buffer), "");

    let guest = CString::new("c:\\x").unwrap();
    assert!(!unsafe { guestpath_convert_path(guest.as_ptr(), std::ptr::null_mut(), 16) });
}

#[test]
fn unresolved_path_comes_back_relative() {
    let _guard = exclusive();
    let (_temp, root) = canonical_temp();
    assert_eq!(map_drive("z:", root.to_str().unwrap(), 0), PathStatus::Ok);

    let (ok, buffer) = convert("c:\\dupa\\test", 64);
    assert!(ok);
    assert_eq!(c_text(&buffer), "dupa/test");
}

#[test]
fn drive_mapping_validation() {
    let _guard = exclusive();
    let (_temp, root) = canonical_temp();
    let root = root.to_str().unwrap();

    assert_eq!(map_drive("c", root, 0), PathStatus::InvalidPath);
    assert_eq!(map_drive("cd:", root, 0), PathStatus::InvalidPath);
    assert_eq!(map_drive("c:", "", 0), PathStatus::InvalidPath);
    assert_eq!(map_drive("d:\\", root, GUESTPATH_FLAG_CASE_SENSITIVE), PathStatus::Ok);

    let broken = DriveMapping {
        entries: std::ptr::null(),
        len: 3,
    };
    assert_eq!(
        unsafe { guestpath_set_drive_mapping(&broken, 0) },
        PathStatus::InvalidPath
    );
    assert_eq!(
        unsafe { guestpath_set_drive_mapping(std::ptr::null(), 0) },
        PathStatus::Ok
    );
}

extern "C" fn q_drive(
    guest_path: *const c_char,
    out_buf: *mut c_char,
    out_len: usize,
    user_data: *mut c_void,
) -> bool {
    let guest = unsafe { CStr::from_ptr(guest_path) }.to_str().unwrap_or("");
    if !guest.eq_ignore_ascii_case("q:") || user_data.is_null() {
        return false;
    }
    let root = unsafe { &*(user_data as *const CString) };
    let bytes = root.as_bytes_with_nul();
    if bytes.len() > out_len {
        return false;
    }
    unsafe { std::ptr::copy_nonoverlapping(bytes.as_ptr(), out_buf as *mut u8, bytes.len()) };
    true
}

#[test]
fn callback_resolver_drives_conversion() {
    let _guard = exclusive();
    let (_temp, root) = canonical_temp();
    let root_c = CString::new(root.to_str().unwrap()).unwrap();

    let status = guestpath_set_resolver_callback(
        Some(q_drive),
        &root_c as *const CString as *mut c_void,
    );
    assert_eq!(status, PathStatus::Ok);

    let (ok, buffer) = convert("Q:\\saves\\slot1.sav", 512);
    assert!(ok);
    assert_eq!(c_text(&buffer), format!("{}/saves/slot1.sav", root.display()));

    assert_eq!(
        guestpath_set_resolver_callback(None, std::ptr::null_mut()),
        PathStatus::Ok
    );
    let (_, buffer) = convert("Q:\\saves\\slot1.sav", 512);
    assert_eq!(c_text(&buffer), "saves/slot1.sav");
}

#[test]
fn symlink_and_delete_round_through_the_boundary() {
    let _guard = exclusive();
    let (_temp, root) = canonical_temp();
    fs::create_dir_all(root.join("game").join("cache")).unwrap();
    fs::write(root.join("game").join("cache").join("blob.bin"), b"x").unwrap();
    assert_eq!(map_drive("c:", root.to_str().unwrap(), 0), PathStatus::Ok);

    let source = CString::new("c:\\game").unwrap();
    let link = CString::new("c:\\game_link").unwrap();
    let cache = CString::new("c:\\game\\cache").unwrap();
    let missing = CString::new("c:\\nothing\\here").unwrap();

    unsafe {
        assert!(guestpath_create_symlink(source.as_ptr(), link.as_ptr()));
        assert!(guestpath_is_symlink(link.as_ptr()));
        assert!(!guestpath_is_symlink(source.as_ptr()));
        assert!(!guestpath_create_symlink(source.as_ptr(), link.as_ptr()));
        assert!(!guestpath_is_symlink(std::ptr::null()));

        assert!(guestpath_delete_path(link.as_ptr()));
        assert!(root.join("game").join("cache").join("blob.bin").exists());

        assert!(guestpath_delete_path(cache.as_ptr()));
        assert!(!root.join("game").join("cache").exists());

        assert!(!guestpath_delete_path(missing.as_ptr()));
        assert!(!guestpath_delete_path(std::ptr::null()));
    }
}
