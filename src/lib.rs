mod common;
mod ffi;
pub mod host;
mod logging;
mod resolver;

#[cfg(not(unix))]
compile_error!("guestpath only supports Unix hosts.");

pub use crate::common::types::*;
pub use crate::ffi::*;
pub use crate::resolver::HostResolver;
