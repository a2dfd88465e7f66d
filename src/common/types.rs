use core::ffi::{c_char, c_void};

#[repr(i32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PathStatus {
    Ok = 0,
    NotFound = 1,
    InvalidPath = 2,
    EncodingError = 3,
    PermissionDenied = 4,
    NotADirectory = 5,
    TooManySymlinks = 6,
    Exists = 7,
    IoError = 8,
}

#[repr(i32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

/// Borrowed UTF-8 bytes; not NUL-terminated.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct StringView {
    pub ptr: *const c_char,
    pub len: usize,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct LogRecord {
    pub level: LogLevel,
    pub target: StringView,
    pub message: StringView,
    pub file: StringView,
    pub line: u32,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct DriveMappingEntry {
    /// Drive designator such as `c:` (trailing separators allowed).
    pub drive: StringView,
    /// Host directory the drive maps onto.
    pub root: StringView,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct DriveMapping {
    pub entries: *const DriveMappingEntry,
    pub len: usize,
}

pub type LogCallback = Option<extern "C" fn(record: *const LogRecord, user_data: *mut c_void)>;

/// Host primitive supplied by the embedder. Writes the NUL-terminated host
/// path into `out_buf` and returns true only when `guest_path` exists.
pub type HostResolveCallback = Option<
    extern "C" fn(
        guest_path: *const c_char,
        out_buf: *mut c_char,
        out_len: usize,
        user_data: *mut c_void,
    ) -> bool,
>;

pub const GUESTPATH_FLAG_CASE_SENSITIVE: u32 = 1 << 0;
