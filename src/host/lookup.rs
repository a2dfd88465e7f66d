use crate::resolver::HostResolver;

use super::canonical::canonicalize_parent_preserving_leaf;
use super::parser::{is_drive_designator, split_path, trim_trailing_separators};

/// Outcome of mapping one guest path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Host path; empty when nothing could be produced.
    pub host_path: String,
    /// Canonical host path of the deepest ancestor the resolver confirmed.
    pub anchor: Option<String>,
    pub resolver_calls: usize,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        !self.host_path.is_empty()
    }

    pub fn is_anchored(&self) -> bool {
        self.anchor.is_some()
    }
}

fn query<R>(resolver: &R, guest_path: &str, calls: &mut usize) -> Option<String>
where
    R: HostResolver + ?Sized,
{
    if guest_path.is_empty() {
        return None;
    }
    *calls += 1;
    let found = resolver
        .resolve_if_exists(guest_path)
        .filter(|host| !host.is_empty());
    match &found {
        Some(host) => log::trace!("resolver mapped '{guest_path}' to '{host}'"),
        None => log::trace!("resolver has no mapping for '{guest_path}'"),
    }
    found
}

fn prepend_component(head: &str, tail: &str) -> String {
    if tail.is_empty() {
        head.to_string()
    } else {
        format!("{head}/{tail}")
    }
}

/// Maps a guest path that may not exist yet onto the host.
///
/// The resolver only answers for existing paths, so the guest path is cut
/// back one component at a time until some ancestor resolves. The ancestor
/// is canonicalized and the cut-off components are appended verbatim,
/// joined with `/`. The full path itself is never sent to the resolver,
/// which keeps a symlinked leaf from being dereferenced.
///
/// When no ancestor resolves the result is the relative tail alone, with a
/// leading drive designator (`c:`) dropped. A bare drive (`c:` or `c:\`)
/// is sent to the resolver as is and yields its root.
pub fn resolve_guest_path<R>(resolver: &R, guest_path: &str) -> Resolution
where
    R: HostResolver + ?Sized,
{
    let trimmed = trim_trailing_separators(guest_path);
    if trimmed.is_empty() {
        return Resolution::default();
    }

    let mut calls = 0usize;
    let first = split_path(trimmed);
    // A bare drive is its own ancestor: query it and return the root alone.
    let (mut parent, mut tail) = if first.parent.is_empty() && is_drive_designator(&first.leaf) {
        (first.leaf, String::new())
    } else {
        (first.parent, first.leaf)
    };

    let mut found = query(resolver, &parent, &mut calls);
    while found.is_none() && !parent.is_empty() {
        let next = split_path(&parent);
        if !(next.parent.is_empty() && is_drive_designator(&next.leaf)) {
            tail = prepend_component(&next.leaf, &tail);
        }
        parent = next.parent;
        found = query(resolver, &parent, &mut calls);
    }

    let Some(ancestor) = found else {
        log::debug!(
            "no ancestor of '{guest_path}' resolved after {calls} lookups; using relative tail '{tail}'"
        );
        return Resolution {
            host_path: tail,
            anchor: None,
            resolver_calls: calls,
        };
    };

    let anchor = canonicalize_parent_preserving_leaf(&ancestor);
    let host_path = if tail.is_empty() {
        anchor.clone()
    } else {
        format!("{}/{}", anchor.trim_end_matches('/'), tail)
    };
    log::trace!("'{guest_path}' -> '{host_path}' ({calls} lookups)");
    Resolution {
        host_path,
        anchor: Some(anchor),
        resolver_calls: calls,
    }
}

/// String-only form of [`resolve_guest_path`]; empty means unresolved.
pub fn resolve<R>(resolver: &R, guest_path: &str) -> String
where
    R: HostResolver + ?Sized,
{
    resolve_guest_path(resolver, guest_path).host_path
}
