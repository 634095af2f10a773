//! Shell-style completion of the path typed into the open-file panel.

use std::path::PathBuf;

use tracing::debug;

use crate::error::OpenFileError;
use crate::host::{Environment, FileSystem};
use crate::paths::{SEP, absolutize, is_sep, join_path, split_path, with_trailing_sep};
use crate::types::DirEntry;

/// A tab at either end of the input asks for a completion pass.
pub(crate) const COMPLETION_MARKER: char = '\t';

pub(crate) fn is_completion_request(text: &str) -> bool {
    text.starts_with(COMPLETION_MARKER) || text.ends_with(COMPLETION_MARKER)
}

pub(crate) fn strip_marker(text: &str) -> &str {
    text.trim_matches(COMPLETION_MARKER)
}

fn eq_nocase(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Longest common prefix compared case-insensitively, keeping the casing of
/// the first name.
pub(crate) fn common_prefix_nocase<S: AsRef<str>>(names: &[S]) -> String {
    let Some((first, rest)) = names.split_first() else {
        return String::new();
    };
    let mut others: Vec<_> = rest.iter().map(|s| s.as_ref().chars()).collect();
    let mut prefix = String::new();
    for ch in first.as_ref().chars() {
        let all_match = others
            .iter_mut()
            .all(|chars| chars.next().is_some_and(|c| eq_nocase(c, ch)));
        if !all_match {
            break;
        }
        prefix.push(ch);
    }
    prefix
}

/// Backspacing over the trailing separator of a directory drops the whole
/// directory: `/a/b/c/` edited to `/a/b/c` becomes `/a/b/`. A single relative
/// component climbs to the current directory, so `a/` becomes `./`.
///
/// Returns `None` when the edit was not such a deletion, including edits in
/// the middle of the line where the last character is unchanged.
pub(crate) fn climb_on_delete(prev: &str, text: &str) -> Option<String> {
    if prev.chars().count() <= text.chars().count() {
        return None;
    }
    let (head, tail) = split_path(prev);
    if !tail.is_empty() || prev.chars().last() == text.chars().last() {
        return None;
    }
    let (parent, _) = split_path(head);
    if parent.is_empty() {
        return Some(format!(".{SEP}"));
    }
    Some(with_trailing_sep(parent.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PathCandidates {
    /// Absolute, normalised directory that was searched.
    pub(crate) dir: PathBuf,
    pub(crate) entries: Vec<DirEntry>,
}

impl PathCandidates {
    pub(crate) fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }
}

/// Works out which directory to search and the name prefix to match,
/// expanding `$VAR`, `~` and `//`.
pub(crate) fn resolve_dir(input: &str, env: &dyn Environment) -> (PathBuf, String) {
    let (head, tail) = split_path(input);
    let mut dir = head.to_string();
    let mut prefix = tail.to_string();

    if let Some((before, var)) = tail.split_once('$') {
        if let Some(value) = env.var(var) {
            let spliced = join_path(head, &join_path(before, &value));
            let (new_head, new_tail) = split_path(&spliced);
            dir = new_head.to_string();
            prefix = new_tail.to_string();
        }
    } else if let Some((_, after_tilde)) = head.rsplit_once('~') {
        if let Some(home) = env.home_dir() {
            dir = home
                .join(after_tilde.trim_start_matches(is_sep))
                .to_string_lossy()
                .into_owned();
        }
        if input.contains("//") {
            dir = env.root_dir().to_string_lossy().into_owned();
        }
    }

    (absolutize(&dir, &env.current_dir()), prefix)
}

pub(crate) fn find_matches(
    input: &str,
    env: &dyn Environment,
    fs: &dyn FileSystem,
) -> Result<PathCandidates, OpenFileError> {
    let (dir, prefix) = resolve_dir(input, env);
    let listing = fs.list_dir(&dir).map_err(|source| OpenFileError::List {
        dir: dir.clone(),
        source,
    })?;
    let wanted = prefix.to_lowercase();
    let entries = listing
        .into_iter()
        .filter(|entry| entry.name.to_lowercase().starts_with(&wanted))
        .collect();
    Ok(PathCandidates { dir, entries })
}

#[derive(Debug)]
pub(crate) enum Completion {
    NoMatch { prefix: String },
    Failed(OpenFileError),
    Single { text: String },
    Multiple { text: String, candidates: PathCandidates },
}

/// Runs one completion pass over marker-free input.
pub(crate) fn complete(input: &str, env: &dyn Environment, fs: &dyn FileSystem) -> Completion {
    let candidates = match find_matches(input, env, fs) {
        Ok(candidates) => candidates,
        Err(err) => {
            debug!(input, error = %err, "completion listing failed");
            return Completion::Failed(err);
        }
    };
    debug!(
        input,
        dir = %candidates.dir.display(),
        matches = candidates.entries.len(),
        "completion pass"
    );
    match candidates.entries.len() {
        0 => Completion::NoMatch {
            prefix: split_path(input).1.to_string(),
        },
        1 => {
            let only = &candidates.entries[0];
            let text = candidates.dir.join(&only.name).to_string_lossy().into_owned();
            let text = if only.is_dir() {
                with_trailing_sep(text)
            } else {
                text
            };
            Completion::Single { text }
        }
        _ => {
            let prefix = common_prefix_nocase(candidates.names().as_slice());
            let text = candidates.dir.join(prefix).to_string_lossy().into_owned();
            Completion::Multiple { text, candidates }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::OsFileSystem;
    use crate::host::fakes::FakeEnvironment;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn path_text(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn common_prefix_is_case_insensitive_and_keeps_first_casing() {
        assert_eq!(common_prefix_nocase(&["Foo1", "foo2", "FOO3"]), "Foo");
    }

    #[test]
    fn common_prefix_edge_cases() {
        let none: [&str; 0] = [];
        assert_eq!(common_prefix_nocase(&none), "");
        assert_eq!(common_prefix_nocase(&["alone"]), "alone");
        assert_eq!(common_prefix_nocase(&["abc", "ab"]), "ab");
        assert_eq!(common_prefix_nocase(&["xyz", "abc"]), "");
    }

    #[test]
    fn marker_detection_and_stripping() {
        assert!(is_completion_request("/tmp/fo\t"));
        assert!(is_completion_request("\t/tmp/fo"));
        assert!(!is_completion_request("/tmp/f\to"));
        assert_eq!(strip_marker("\t/tmp/fo\t\t"), "/tmp/fo");
    }

    #[test]
    fn deleting_trailing_separator_climbs_one_level() {
        assert_eq!(climb_on_delete("/a/b/c/", "/a/b/c"), Some("/a/b/".to_string()));
        assert_eq!(climb_on_delete("/a/", "/a"), Some("/".to_string()));
    }

    #[test]
    fn other_deletions_are_left_alone() {
        // Deleting a character of a file name.
        assert_eq!(climb_on_delete("/a/bc", "/a/b"), None);
        // Deleting in the middle of the line keeps the trailing separator.
        assert_eq!(climb_on_delete("/a/bb/", "/a/b/"), None);
        // Typing, not deleting.
        assert_eq!(climb_on_delete("/a/", "/a/x"), None);
    }

    #[test]
    fn relative_single_component_climbs_to_current_dir() {
        assert_eq!(climb_on_delete("a/", "a"), Some(format!(".{SEP}")));
    }

    #[test]
    fn single_directory_match_gets_trailing_separator() {
        let tmp = tempdir().expect("tempdir");
        fs::create_dir(tmp.path().join("reports")).expect("mkdir");
        fs::write(tmp.path().join("notes.txt"), "").expect("write");
        let env = FakeEnvironment::rooted_at(tmp.path());
        let input = format!("{}{SEP}rep", path_text(tmp.path()));
        match complete(&input, &env, &OsFileSystem) {
            Completion::Single { text } => {
                assert_eq!(text, format!("{}{SEP}reports{SEP}", path_text(tmp.path())));
            }
            other => panic!("expected single match, got {other:?}"),
        }
    }

    #[test]
    fn single_file_match_has_no_trailing_separator() {
        let tmp = tempdir().expect("tempdir");
        fs::write(tmp.path().join("Notes.txt"), "").expect("write");
        let env = FakeEnvironment::rooted_at(tmp.path());
        let input = format!("{}{SEP}no", path_text(tmp.path()));
        match complete(&input, &env, &OsFileSystem) {
            Completion::Single { text } => {
                assert_eq!(text, format!("{}{SEP}Notes.txt", path_text(tmp.path())));
            }
            other => panic!("expected single match, got {other:?}"),
        }
    }

    #[test]
    fn no_match_reports_typed_prefix() {
        let tmp = tempdir().expect("tempdir");
        fs::write(tmp.path().join("a.txt"), "").expect("write");
        let env = FakeEnvironment::rooted_at(tmp.path());
        let input = format!("{}{SEP}zzz", path_text(tmp.path()));
        match complete(&input, &env, &OsFileSystem) {
            Completion::NoMatch { prefix } => assert_eq!(prefix, "zzz"),
            other => panic!("expected no match, got {other:?}"),
        }
    }

    #[test]
    fn missing_directory_is_a_listing_failure() {
        let tmp = tempdir().expect("tempdir");
        let env = FakeEnvironment::rooted_at(tmp.path());
        let input = format!("{}{SEP}gone{SEP}x", path_text(tmp.path()));
        match complete(&input, &env, &OsFileSystem) {
            Completion::Failed(OpenFileError::List { dir, .. }) => {
                assert_eq!(dir, tmp.path().join("gone"));
            }
            other => panic!("expected listing failure, got {other:?}"),
        }
    }

    #[test]
    fn multiple_matches_complete_to_common_prefix() {
        let tmp = tempdir().expect("tempdir");
        for name in ["Foo1", "foo2", "FOO3", "bar"] {
            fs::write(tmp.path().join(name), "").expect("write");
        }
        let env = FakeEnvironment::rooted_at(tmp.path());
        let input = format!("{}{SEP}f", path_text(tmp.path()));
        match complete(&input, &env, &OsFileSystem) {
            Completion::Multiple { text, candidates } => {
                assert_eq!(text, format!("{}{SEP}FOO", path_text(tmp.path())));
                assert_eq!(candidates.names(), vec!["FOO3", "Foo1", "foo2"]);
            }
            other => panic!("expected multiple matches, got {other:?}"),
        }
    }

    #[test]
    fn relative_input_resolves_against_current_dir() {
        let tmp = tempdir().expect("tempdir");
        fs::create_dir(tmp.path().join("src")).expect("mkdir");
        fs::write(tmp.path().join("src").join("main.rs"), "").expect("write");
        let env = FakeEnvironment::rooted_at(tmp.path());
        match complete("src/ma", &env, &OsFileSystem) {
            Completion::Single { text } => {
                assert_eq!(text, path_text(&tmp.path().join("src").join("main.rs")));
            }
            other => panic!("expected single match, got {other:?}"),
        }
    }

    #[test]
    fn tilde_expands_to_home() {
        let tmp = tempdir().expect("tempdir");
        fs::create_dir(tmp.path().join("reports")).expect("mkdir");
        let env = FakeEnvironment::rooted_at(tmp.path());
        let (dir, prefix) = resolve_dir("~/rep", &env);
        assert_eq!(dir, tmp.path());
        assert_eq!(prefix, "rep");
    }

    #[test]
    fn tilde_keeps_path_after_home() {
        let tmp = tempdir().expect("tempdir");
        let env = FakeEnvironment::rooted_at(tmp.path());
        let (dir, prefix) = resolve_dir("~/docs/drafts/ch", &env);
        assert_eq!(dir, tmp.path().join("docs").join("drafts"));
        assert_eq!(prefix, "ch");
    }

    #[test]
    fn double_separator_after_tilde_jumps_to_root() {
        let tmp = tempdir().expect("tempdir");
        let env = FakeEnvironment::rooted_at(tmp.path());
        let (dir, prefix) = resolve_dir("~/projects//us", &env);
        assert_eq!(dir, PathBuf::from(std::path::MAIN_SEPARATOR_STR));
        assert_eq!(prefix, "us");
    }

    #[test]
    fn environment_variable_is_spliced_in() {
        let tmp = tempdir().expect("tempdir");
        let proj = tmp.path().join("proj");
        fs::create_dir(&proj).expect("mkdir");
        let env = FakeEnvironment::rooted_at(tmp.path()).with_var("PROJ", &path_text(&proj));
        match complete("$PROJ", &env, &OsFileSystem) {
            Completion::Single { text } => {
                assert_eq!(text, format!("{}{SEP}", path_text(&proj)));
            }
            other => panic!("expected single match, got {other:?}"),
        }
    }

    #[test]
    fn unknown_environment_variable_is_not_expanded() {
        let tmp = tempdir().expect("tempdir");
        let env = FakeEnvironment::rooted_at(tmp.path());
        let (dir, prefix) = resolve_dir("$NOPE_NOT_SET", &env);
        assert_eq!(dir, tmp.path());
        assert_eq!(prefix, "$NOPE_NOT_SET");
    }

    #[test]
    fn environment_variable_after_leading_text_is_joined() {
        let tmp = tempdir().expect("tempdir");
        let proj = tmp.path().join("proj");
        fs::create_dir(&proj).expect("mkdir");
        fs::write(proj.join("lib.rs"), "").expect("write");
        // The variable holds a relative name, so the text before `$` is the
        // directory it is joined onto.
        let env = FakeEnvironment::rooted_at(tmp.path()).with_var("SUB", "lib");
        let input = format!("{}{SEP}proj{SEP}x$SUB", path_text(tmp.path()));
        let (dir, prefix) = resolve_dir(&input, &env);
        assert_eq!(dir, proj.join("x"));
        assert_eq!(prefix, "lib");

        let input = format!("{}{SEP}proj{SEP}$SUB", path_text(tmp.path()));
        match complete(&input, &env, &OsFileSystem) {
            Completion::Single { text } => assert_eq!(text, path_text(&proj.join("lib.rs"))),
            other => panic!("expected single match, got {other:?}"),
        }
    }

    #[test]
    fn double_separator_after_tilde_lists_the_root() {
        let tmp = tempdir().expect("tempdir");
        let env = FakeEnvironment::rooted_at(tmp.path());
        let root = PathBuf::from(std::path::MAIN_SEPARATOR_STR);
        let wanted: Vec<String> = fs::read_dir(&root)
            .expect("read root")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.to_lowercase().starts_with("u"))
            .collect();
        match find_matches("~//u", &env, &OsFileSystem) {
            Ok(candidates) => {
                assert_eq!(candidates.dir, root);
                let mut got: Vec<String> =
                    candidates.names().into_iter().map(str::to_string).collect();
                let mut wanted = wanted;
                got.sort();
                wanted.sort();
                assert_eq!(got, wanted);
            }
            Err(err) => panic!("root listing failed: {err}"),
        }
    }
}
