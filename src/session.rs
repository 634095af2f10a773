//! One run of the open-file command, from the panel opening until it closes.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::completion::{
    Completion, climb_on_delete, complete, is_completion_request, strip_marker,
};
use crate::host::{Environment, FileSystem, OsEnvironment, OsFileSystem, Window};
use crate::paths::with_trailing_sep;
use crate::scratch::{DEFAULT_COLUMN_SPACING, DEFAULT_ROW_SHRINK, ScratchPane};
use crate::settings::Settings;
use crate::types::DirEntry;

pub(crate) const PROMPT: &str = "Open file:";

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SessionOptions {
    /// List ambiguous matches in a scratch pane instead of the status line.
    pub(crate) use_scratch_buffer: bool,
    pub(crate) column_spacing: usize,
    pub(crate) row_shrink: f64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            use_scratch_buffer: true,
            column_spacing: DEFAULT_COLUMN_SPACING,
            row_shrink: DEFAULT_ROW_SHRINK,
        }
    }
}

impl SessionOptions {
    pub(crate) fn from_settings(settings: &Settings) -> Self {
        Self {
            use_scratch_buffer: settings.use_scratch_buffer,
            column_spacing: settings.scratch_column_spacing,
            row_shrink: settings.scratch_row_shrink,
        }
    }
}

pub(crate) fn next_group(current: usize, count: usize) -> usize {
    if current + 1 < count { current + 1 } else { 0 }
}

pub(crate) struct OpenFileSession<E = OsEnvironment, F = OsFileSystem> {
    prev_text: String,
    options: SessionOptions,
    scratch: Option<ScratchPane>,
    env: E,
    fs: F,
}

impl<E: Environment, F: FileSystem> OpenFileSession<E, F> {
    /// Shows the input panel, pre-filled with the directory of the active
    /// view's file, or the home directory when there is none.
    pub(crate) fn start(window: &mut dyn Window, options: SessionOptions, env: E, fs: F) -> Self {
        let initial = initial_text(window, &env);
        debug!(initial, ?options, "open file panel");
        window.show_input_panel(PROMPT, &initial);
        Self {
            prev_text: initial,
            options,
            scratch: None,
            env,
            fs,
        }
    }

    #[cfg(test)]
    pub(crate) fn prev_text(&self) -> &str {
        &self.prev_text
    }

    #[cfg(test)]
    pub(crate) fn has_scratch_pane(&self) -> bool {
        self.scratch.is_some()
    }

    pub(crate) fn on_change(&mut self, text: &str, window: &mut dyn Window) {
        if text.is_empty() {
            return;
        }
        let prev = std::mem::replace(&mut self.prev_text, text.to_string());
        let mut new_text = climb_on_delete(&prev, text);

        if is_completion_request(text) {
            new_text = Some(self.run_completion(strip_marker(text), window));
        }

        if let Some(new_text) = new_text {
            window.set_input_text(&new_text);
            self.prev_text = new_text;
        }
    }

    fn run_completion(&mut self, input: &str, window: &mut dyn Window) -> String {
        match complete(input, &self.env, &self.fs) {
            Completion::NoMatch { prefix } => {
                window.status_message(&format!("No files match \"{prefix}\""));
                if self.scratch.is_some() {
                    self.show_listing(&[], window);
                }
                input.to_string()
            }
            Completion::Failed(err) => {
                window.status_message(&err.to_string());
                if self.scratch.is_some() {
                    self.show_listing(&[], window);
                }
                input.to_string()
            }
            Completion::Single { text } => {
                window.status_message("1 files match");
                text
            }
            Completion::Multiple { text, candidates } => {
                window.status_message(&format!("{} files match", candidates.entries.len()));
                if self.options.use_scratch_buffer {
                    if text == input {
                        self.show_listing(&candidates.entries, window);
                    }
                } else {
                    window.status_message(&format!("{{ {} }}", candidates.names().join(", ")));
                }
                text
            }
        }
    }

    fn show_listing(&mut self, entries: &[DirEntry], window: &mut dyn Window) {
        let pane = match self.scratch.take() {
            Some(pane) => {
                pane.clear(window);
                pane
            }
            None => ScratchPane::open(window, self.options.row_shrink),
        };
        pane.show(window, entries, self.options.column_spacing);
        self.scratch = Some(pane);
    }

    fn close_panel(&mut self, window: &mut dyn Window) {
        if let Some(pane) = self.scratch.take() {
            pane.close(window);
        }
    }

    /// Enter in the panel. The scratch pane is torn down before the file is
    /// opened so the file does not land in it.
    pub(crate) fn on_done(mut self, text: &str, window: &mut dyn Window) {
        self.close_panel(window);
        let path = strip_marker(text);
        match window.open_file(Path::new(path)) {
            Ok(view) => {
                let group = next_group(window.active_group(), window.num_groups());
                window.move_view_to_group(view, group);
                info!(path, group, "opened file");
            }
            Err(err) => {
                warn!(path, error = %err, "open failed");
                window.status_message(&format!("Unable to open \"{path}\""));
            }
        }
    }

    pub(crate) fn on_cancel(mut self, window: &mut dyn Window) {
        self.close_panel(window);
    }
}

pub(crate) fn initial_text(window: &dyn Window, env: &dyn Environment) -> String {
    let from_active = window
        .active_view()
        .and_then(|view| window.view_file_name(view))
        .and_then(|path| path.parent().map(Path::to_path_buf));
    if let Some(dir) = from_active {
        return with_trailing_sep(dir.to_string_lossy().into_owned());
    }
    match env.home_dir() {
        Some(home) => with_trailing_sep(home.to_string_lossy().into_owned()),
        None => with_trailing_sep(env.current_dir().to_string_lossy().into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Workspace;
    use crate::host::fakes::FakeEnvironment;
    use crate::layout::PaneLayout;
    use crate::paths::SEP;
    use ratatui::layout::Rect;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};

    type TestSession = OpenFileSession<FakeEnvironment, OsFileSystem>;

    fn two_columns() -> PaneLayout {
        PaneLayout {
            cols: vec![0.0, 0.5, 1.0],
            rows: vec![0.0, 1.0],
            cells: vec![[0, 0, 1, 1], [1, 0, 2, 1]],
        }
    }

    fn fixture() -> (TempDir, Workspace) {
        let tmp = tempdir().expect("tempdir");
        for name in ["alpha.txt", "alps.txt", "beta.rs"] {
            fs::write(tmp.path().join(name), name).expect("write");
        }
        fs::create_dir(tmp.path().join("reports")).expect("mkdir");
        fs::write(tmp.path().join("reports").join("q1.csv"), "1").expect("write");
        let ws = Workspace::new(two_columns(), Rect::new(0, 0, 100, 30));
        (tmp, ws)
    }

    fn start(tmp: &TempDir, ws: &mut Workspace, options: SessionOptions) -> TestSession {
        OpenFileSession::start(
            ws,
            options,
            FakeEnvironment::rooted_at(tmp.path()),
            OsFileSystem,
        )
    }

    fn dir_text(tmp: &TempDir) -> String {
        format!("{}{SEP}", tmp.path().display())
    }

    /// Types `text` into the panel the way the host does: update the panel
    /// value, then report the change.
    fn type_text(session: &mut TestSession, ws: &mut Workspace, text: &str) {
        ws.set_input_text(text);
        session.on_change(text, ws);
    }

    #[test]
    fn start_prefills_home_directory() {
        let (tmp, mut ws) = fixture();
        let session = start(&tmp, &mut ws, SessionOptions::default());
        assert_eq!(session.prev_text(), dir_text(&tmp));
        assert_eq!(ws.input_text(), Some(dir_text(&tmp).as_str()));
    }

    #[test]
    fn start_prefills_directory_of_active_file() {
        let (tmp, mut ws) = fixture();
        let file = tmp.path().join("reports").join("q1.csv");
        ws.open_file(&file).expect("open");
        let session = start(&tmp, &mut ws, SessionOptions::default());
        assert_eq!(
            session.prev_text(),
            format!("{}{SEP}", tmp.path().join("reports").display())
        );
    }

    #[test]
    fn single_directory_match_completes_with_separator() {
        let (tmp, mut ws) = fixture();
        let mut session = start(&tmp, &mut ws, SessionOptions::default());
        type_text(&mut session, &mut ws, &format!("{}rep\t", dir_text(&tmp)));
        let expected = format!("{}reports{SEP}", dir_text(&tmp));
        assert_eq!(ws.input_text(), Some(expected.as_str()));
        assert_eq!(session.prev_text(), expected);
        assert_eq!(ws.status(), "1 files match");
    }

    #[test]
    fn zero_matches_strip_marker_and_keep_text() {
        let (tmp, mut ws) = fixture();
        let mut session = start(&tmp, &mut ws, SessionOptions::default());
        let typed = format!("{}zzz", dir_text(&tmp));
        type_text(&mut session, &mut ws, &format!("{typed}\t"));
        assert_eq!(ws.input_text(), Some(typed.as_str()));
        assert_eq!(ws.status(), "No files match \"zzz\"");
        assert!(!session.has_scratch_pane());
    }

    #[test]
    fn listing_failure_is_reported_distinctly() {
        let (tmp, mut ws) = fixture();
        let mut session = start(&tmp, &mut ws, SessionOptions::default());
        let typed = format!("{}missing{SEP}x", dir_text(&tmp));
        type_text(&mut session, &mut ws, &format!("{typed}\t"));
        assert_eq!(ws.input_text(), Some(typed.as_str()));
        assert!(ws.status().starts_with("Unable to list"));
    }

    #[test]
    fn second_tab_on_ambiguous_prefix_shows_listing() {
        let (tmp, mut ws) = fixture();
        let before = ws.layout();
        let mut session = start(&tmp, &mut ws, SessionOptions::default());

        type_text(&mut session, &mut ws, &format!("{}a\t", dir_text(&tmp)));
        let completed = format!("{}alp", dir_text(&tmp));
        assert_eq!(ws.input_text(), Some(completed.as_str()));
        assert_eq!(ws.status(), "2 files match");
        assert!(!session.has_scratch_pane());
        assert_eq!(ws.layout(), before);

        type_text(&mut session, &mut ws, &format!("{completed}\t"));
        assert_eq!(ws.input_text(), Some(completed.as_str()));
        assert!(session.has_scratch_pane());
        assert_eq!(ws.num_groups(), 3);
        let listing = ws
            .views()
            .into_iter()
            .filter_map(|v| ws.view(v))
            .find(|v| v.scratch)
            .expect("scratch view");
        assert!(listing.text.starts_with("2 files in directory"));
        assert!(listing.text.contains("alpha.txt"));
        assert!(listing.read_only);
    }

    #[test]
    fn later_listings_reuse_the_scratch_pane() {
        let (tmp, mut ws) = fixture();
        let mut session = start(&tmp, &mut ws, SessionOptions::default());
        let completed = format!("{}alp", dir_text(&tmp));
        type_text(&mut session, &mut ws, &format!("{completed}\t"));
        let views_after_first = ws.views();

        type_text(&mut session, &mut ws, &format!("{completed}\t"));
        assert_eq!(ws.views(), views_after_first);
        assert_eq!(ws.num_groups(), 3);

        type_text(&mut session, &mut ws, &format!("{}zzz\t", dir_text(&tmp)));
        let listing = ws
            .views()
            .into_iter()
            .filter_map(|v| ws.view(v))
            .find(|v| v.scratch)
            .expect("scratch view");
        assert_eq!(listing.text, "No files found in current directory");
    }

    #[test]
    fn listing_failure_empties_an_open_scratch_pane() {
        let (tmp, mut ws) = fixture();
        let mut session = start(&tmp, &mut ws, SessionOptions::default());
        let completed = format!("{}alp", dir_text(&tmp));
        type_text(&mut session, &mut ws, &format!("{completed}\t"));
        assert!(session.has_scratch_pane());
        let views_with_listing = ws.views();

        let typed = format!("{}missing{SEP}x", dir_text(&tmp));
        type_text(&mut session, &mut ws, &format!("{typed}\t"));
        assert_eq!(ws.input_text(), Some(typed.as_str()));
        assert!(ws.status().starts_with("Unable to list"));
        assert_eq!(ws.views(), views_with_listing);
        let listing = ws
            .views()
            .into_iter()
            .filter_map(|v| ws.view(v))
            .find(|v| v.scratch)
            .expect("scratch view");
        assert_eq!(listing.text, "No files found in current directory");
    }

    #[test]
    fn inline_mode_lists_candidates_in_status() {
        let (tmp, mut ws) = fixture();
        let options = SessionOptions {
            use_scratch_buffer: false,
            ..SessionOptions::default()
        };
        let mut session = start(&tmp, &mut ws, options);
        let completed = format!("{}alp", dir_text(&tmp));
        type_text(&mut session, &mut ws, &format!("{completed}\t"));
        assert_eq!(ws.status(), "{ alpha.txt, alps.txt }");
        assert!(!session.has_scratch_pane());
        assert_eq!(ws.num_groups(), 2);
    }

    #[test]
    fn backspace_over_separator_climbs_a_directory() {
        let (tmp, mut ws) = fixture();
        let mut session = start(&tmp, &mut ws, SessionOptions::default());
        let reports = format!("{}reports{SEP}", dir_text(&tmp));
        type_text(&mut session, &mut ws, &reports);
        type_text(&mut session, &mut ws, reports.trim_end_matches(SEP));
        assert_eq!(ws.input_text(), Some(dir_text(&tmp).as_str()));
        assert_eq!(session.prev_text(), dir_text(&tmp));
    }

    #[test]
    fn plain_typing_only_tracks_text() {
        let (tmp, mut ws) = fixture();
        let mut session = start(&tmp, &mut ws, SessionOptions::default());
        let typed = format!("{}al", dir_text(&tmp));
        type_text(&mut session, &mut ws, &typed);
        assert_eq!(session.prev_text(), typed);
        assert_eq!(ws.status(), "");
        session.on_change("", &mut ws);
        assert_eq!(session.prev_text(), typed);
    }

    #[test]
    fn cancel_restores_layout_exactly() {
        let (tmp, mut ws) = fixture();
        let before = ws.layout();
        let mut session = start(&tmp, &mut ws, SessionOptions::default());
        let completed = format!("{}alp", dir_text(&tmp));
        type_text(&mut session, &mut ws, &format!("{completed}\t"));
        type_text(&mut session, &mut ws, &format!("{}be\t", dir_text(&tmp)));
        assert_ne!(ws.layout(), before);
        session.on_cancel(&mut ws);
        assert_eq!(ws.layout(), before);
        // The listing was the only view, so a blank one takes its place.
        assert_eq!(ws.views().len(), 1);
        let blank = ws.views()[0];
        assert_eq!(ws.view(blank).expect("view").text, "");
    }

    #[test]
    fn confirm_restores_layout_and_opens_in_next_group() {
        let (tmp, mut ws) = fixture();
        let before = ws.layout();
        ws.focus_group(0);
        let mut session = start(&tmp, &mut ws, SessionOptions::default());
        type_text(&mut session, &mut ws, &format!("{}alp\t", dir_text(&tmp)));
        type_text(&mut session, &mut ws, &format!("{}be\t", dir_text(&tmp)));
        let target = format!("{}beta.rs", dir_text(&tmp));
        assert_eq!(ws.input_text(), Some(target.as_str()));

        session.on_done(&target, &mut ws);
        assert_eq!(ws.layout(), before);
        assert_eq!(ws.active_group(), 1);
        let view = ws.active_view().expect("active view");
        assert_eq!(ws.view_file_name(view), Some(PathBuf::from(&target)));
    }

    #[test]
    fn confirm_from_last_group_wraps_to_first() {
        let (tmp, mut ws) = fixture();
        ws.focus_group(1);
        let session = start(&tmp, &mut ws, SessionOptions::default());
        let target = format!("{}alpha.txt", dir_text(&tmp));
        session.on_done(&target, &mut ws);
        assert_eq!(ws.active_group(), 0);
    }

    #[test]
    fn confirm_with_directory_reports_failure() {
        let (tmp, mut ws) = fixture();
        let session = start(&tmp, &mut ws, SessionOptions::default());
        let target = format!("{}reports{SEP}", dir_text(&tmp));
        session.on_done(&target, &mut ws);
        assert_eq!(ws.status(), format!("Unable to open \"{target}\""));
        assert!(ws.views().is_empty());
    }

    #[test]
    fn round_robin_group_order() {
        assert_eq!(next_group(0, 3), 1);
        assert_eq!(next_group(1, 3), 2);
        assert_eq!(next_group(2, 3), 0);
        assert_eq!(next_group(0, 1), 0);
    }
}
