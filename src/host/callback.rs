use core::ffi::{c_char, c_void};
use std::ffi::{CStr, CString};

use crate::common::types::HostResolveCallback;
use crate::resolver::HostResolver;

const HOST_PATH_CAPACITY: usize = libc::PATH_MAX as usize;

type RawCallback = extern "C" fn(*const c_char, *mut c_char, usize, *mut c_void) -> bool;

/// Forwards lookups to a resolver supplied by the embedding process.
///
/// `user_data` is handed back on every call; the embedder is responsible for
/// it being usable from whichever thread calls into the library.
pub struct CallbackResolver {
    callback: RawCallback,
    user_data: usize,
}

impl CallbackResolver {
    pub fn new(callback: HostResolveCallback, user_data: *mut c_void) -> Option<Self> {
        callback.map(|callback| Self {
            callback,
            user_data: user_data as usize,
        })
    }
}

impl HostResolver for CallbackResolver {
    fn resolve_if_exists(&self, guest_path: &str) -> Option<String> {
        let guest = CString::new(guest_path).ok()?;
        let mut buffer = vec![0u8; HOST_PATH_CAPACITY];
        let found = (self.callback)(
            guest.as_ptr(),
            buffer.as_mut_ptr() as *mut c_char,
            buffer.len(),
            self.user_data as *mut c_void,
        );
        if !found {
            return None;
        }
        let Ok(value) = CStr::from_bytes_until_nul(&buffer) else {
            log::warn!("host resolver callback returned an unterminated path for '{guest_path}'");
            return None;
        };
        match value.to_str() {
            Ok("") => None,
            Ok(host) => Some(host.to_string()),
            Err(_) => {
                log::debug!("host resolver callback returned non-UTF-8 path for '{guest_path}'");
                None
            }
        }
    }
}
