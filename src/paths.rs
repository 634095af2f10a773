//! String-level path helpers for text typed into the input panel.
//!
//! Input text is edited character by character, so these work on `&str`
//! rather than `Path` and keep trailing separators intact.

use std::path::{Component, MAIN_SEPARATOR, Path, PathBuf};

pub(crate) const SEP: char = MAIN_SEPARATOR;

pub(crate) fn is_sep(c: char) -> bool {
    c == '/' || c == MAIN_SEPARATOR
}

/// Splits at the last separator into `(head, tail)`.
///
/// Trailing separators are dropped from `head` unless it consists only of
/// separators, so `"/a/b/"` gives `("/a/b", "")` and `"/x"` gives `("/", "x")`.
pub(crate) fn split_path(path: &str) -> (&str, &str) {
    let Some(idx) = path.rfind(is_sep) else {
        return ("", path);
    };
    let head = &path[..=idx];
    let tail = &path[idx + 1..];
    let trimmed = head.trim_end_matches(is_sep);
    if trimmed.is_empty() {
        (head, tail)
    } else {
        (trimmed, tail)
    }
}

/// Joins two fragments; an absolute `rest` replaces `base`.
pub(crate) fn join_path(base: &str, rest: &str) -> String {
    if base.is_empty() || rest.starts_with(is_sep) || Path::new(rest).is_absolute() {
        return rest.to_string();
    }
    if base.ends_with(is_sep) {
        format!("{base}{rest}")
    } else {
        format!("{base}{SEP}{rest}")
    }
}

/// Folds `.` and `..` components without touching the filesystem.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

pub(crate) fn absolutize(dir: &str, cwd: &Path) -> PathBuf {
    let path = Path::new(dir);
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&cwd.join(path))
    }
}

pub(crate) fn with_trailing_sep(mut path: String) -> String {
    if !path.ends_with(is_sep) {
        path.push(SEP);
    }
    path
}
