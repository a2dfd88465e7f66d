use std::fs;

use super::parser::split_path;

/// Best-effort `realpath`; any failure hands back the input untouched.
pub fn canonicalize(host_path: &str) -> String {
    if host_path.is_empty() {
        return String::new();
    }
    match fs::canonicalize(host_path) {
        Ok(resolved) => match resolved.to_str() {
            Some(value) => value.to_string(),
            None => {
                log::debug!("canonical form of '{host_path}' is not UTF-8; keeping input");
                host_path.to_string()
            }
        },
        Err(err) => {
            log::debug!("canonicalize '{host_path}' failed ({err}); keeping input");
            host_path.to_string()
        }
    }
}

/// Canonicalizes the parent only, so a symlinked leaf keeps its own name.
pub fn canonicalize_parent_preserving_leaf(host_path: &str) -> String {
    let parts = split_path(host_path);
    if parts.parent.is_empty() || parts.leaf.is_empty() {
        return host_path.to_string();
    }
    format!("{}/{}", canonicalize(&parts.parent), parts.leaf)
}
