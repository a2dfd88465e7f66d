use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::resolver::HostResolver;

use super::parser::{drive_letter, fold_key, normalize_separators};

#[derive(Debug, Clone)]
pub struct DriveMapConfig {
    /// Uppercase drive letter to host root.
    pub drives: HashMap<char, PathBuf>,
    pub case_insensitive: bool,
}

impl Default for DriveMapConfig {
    fn default() -> Self {
        Self {
            drives: HashMap::new(),
            case_insensitive: true,
        }
    }
}

impl DriveMapConfig {
    pub fn with_drive(mut self, drive: char, root: impl Into<PathBuf>) -> Self {
        self.drives.insert(drive.to_ascii_uppercase(), root.into());
        self
    }

    pub fn case_sensitive(mut self) -> Self {
        self.case_insensitive = false;
        self
    }
}

/// Resolver backed by a drive table, the way a compatibility prefix maps
/// `c:` and friends onto host directories.
///
/// Drive-prefixed paths are looked up under the mapped root, `/`-rooted
/// paths under the host root, anything else under the current directory.
/// Components that miss an exact match fall back to a case-folded scan of
/// the directory; more than one candidate counts as not found.
#[derive(Debug, Clone, Default)]
pub struct DriveMapResolver {
    config: DriveMapConfig,
}

impl DriveMapResolver {
    pub fn new(config: DriveMapConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DriveMapConfig {
        &self.config
    }

    fn classify_root<'a>(&self, normalized: &'a str) -> Option<(PathBuf, &'a str)> {
        let first = normalized.split('/').next().unwrap_or("");
        if let Some(letter) = drive_letter(first) {
            let Some(root) = self.config.drives.get(&letter) else {
                log::trace!("drive {letter}: is not mapped");
                return None;
            };
            return Some((root.clone(), &normalized[first.len()..]));
        }
        if normalized.starts_with('/') {
            return Some((PathBuf::from("/"), normalized));
        }
        match std::env::current_dir() {
            Ok(cwd) => Some((cwd, normalized)),
            Err(err) => {
                log::debug!("current directory unavailable for relative lookup: {err}");
                None
            }
        }
    }

    fn select_component(&self, dir: &Path, component: &str) -> Option<String> {
        match fs::symlink_metadata(dir.join(component)) {
            Ok(_) => return Some(component.to_string()),
            Err(err) if err.kind() == io::ErrorKind::NotFound && self.config.case_insensitive => {}
            Err(_) => return None,
        }

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                log::trace!("cannot scan {} for '{component}': {err}", dir.display());
                return None;
            }
        };
        let key = fold_key(component);
        let mut matches: Vec<String> = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name();
            // Non-UTF-8 names can never match a UTF-8 guest component.
            let Some(name) = name.to_str() else {
                continue;
            };
            if fold_key(name) == key {
                matches.push(name.to_string());
            }
        }
        if matches.len() > 1 {
            matches.sort();
            log::debug!(
                "ambiguous match for '{component}' in {}: {}",
                dir.display(),
                matches.join(", ")
            );
            return None;
        }
        matches.pop()
    }
}

impl HostResolver for DriveMapResolver {
    fn resolve_if_exists(&self, guest_path: &str) -> Option<String> {
        if guest_path.is_empty() {
            return None;
        }
        let normalized = normalize_separators(guest_path);
        let (root, remainder) = self.classify_root(&normalized)?;

        let components: Vec<&str> = remainder
            .split('/')
            .filter(|part| !part.is_empty() && *part != ".")
            .collect();
        let mut current = root;
        let mut depth = 0usize;
        for (idx, component) in components.iter().enumerate() {
            if *component == ".." {
                if depth == 0 {
                    log::trace!("'{guest_path}' escapes its root");
                    return None;
                }
                current.pop();
                depth -= 1;
                continue;
            }
            let name = self.select_component(&current, component)?;
            current.push(name);
            depth += 1;

            let is_last = idx + 1 == components.len();
            if !is_last && !fs::metadata(&current).map(|m| m.is_dir()).unwrap_or(false) {
                return None;
            }
        }

        fs::symlink_metadata(&current).ok()?;
        current.to_str().map(str::to_string)
    }
}
