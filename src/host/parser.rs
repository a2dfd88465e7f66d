#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathComponents {
    pub parent: String,
    pub leaf: String,
}

pub fn is_separator(ch: char) -> bool {
    ch == '/' || ch == '\\'
}

pub fn trim_trailing_separators(path: &str) -> &str {
    path.trim_end_matches(is_separator)
}

/// Splits on the last `/` or `\`. The parent loses any trailing separators,
/// so `a\\b` and `a//b` both give `("a", "b")`.
pub fn split_path(path: &str) -> PathComponents {
    match path.rfind(is_separator) {
        None => PathComponents {
            parent: String::new(),
            leaf: path.to_string(),
        },
        Some(idx) => PathComponents {
            // Both separators are one byte wide.
            parent: trim_trailing_separators(&path[..idx]).to_string(),
            leaf: path[idx + 1..].to_string(),
        },
    }
}

/// True for a bare `X:` segment.
pub fn is_drive_designator(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Uppercase drive letter of a designator such as `c:` or `C:\`.
pub fn drive_letter(segment: &str) -> Option<char> {
    let trimmed = trim_trailing_separators(segment);
    if !is_drive_designator(trimmed) {
        return None;
    }
    trimmed.chars().next().map(|c| c.to_ascii_uppercase())
}

pub fn normalize_separators(input: &str) -> String {
    input.replace('\\', "/")
}

/// Simple uppercase of one character. Characters whose uppercase form is
/// longer than one character (`ß` -> `SS`) fold to themselves.
fn fold_char(ch: char) -> char {
    let mut upper = ch.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(single), None) => single,
        _ => ch,
    }
}

/// Case-folding key used for case-insensitive component matching. Keys have
/// the same number of characters as the component.
pub fn fold_key(component: &str) -> String {
    component.chars().map(fold_char).collect()
}
