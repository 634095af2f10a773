//! Capabilities the open-file command needs from its surroundings.
//!
//! The command never reaches for global editor or process state. The host
//! editor hands it a [`Window`] on every event, and the session is built with
//! an [`Environment`] and a [`FileSystem`] so both can be replaced in tests.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::OpenFileError;
use crate::layout::PaneLayout;
use crate::types::{DirEntry, EntryKind, ViewId};

pub(crate) trait Window {
    fn layout(&self) -> PaneLayout;
    /// Replaces the whole layout. Views in groups that no longer exist move
    /// to the last remaining group.
    fn set_layout(&mut self, layout: PaneLayout);

    fn num_groups(&self) -> usize;
    fn active_group(&self) -> usize;
    fn focus_group(&mut self, group: usize);
    fn move_view_to_group(&mut self, view: ViewId, group: usize);

    fn views(&self) -> Vec<ViewId>;
    fn active_view(&self) -> Option<ViewId>;
    fn focus_view(&mut self, view: ViewId);
    fn close_active_view(&mut self);
    /// Creates an empty, never-saved view in the active group and focuses it.
    fn new_scratch_view(&mut self) -> ViewId;
    fn view_file_name(&self, view: ViewId) -> Option<PathBuf>;
    fn set_view_text(&mut self, view: ViewId, text: &str) -> Result<(), OpenFileError>;
    fn set_read_only(&mut self, view: ViewId, read_only: bool);
    /// Visible width of the view in pixels (terminal cells for a TUI host).
    fn viewport_width(&self, view: ViewId) -> f32;
    /// Width of one character cell in the same unit as `viewport_width`.
    fn em_width(&self, view: ViewId) -> f32;

    fn open_file(&mut self, path: &Path) -> Result<ViewId, OpenFileError>;

    fn show_input_panel(&mut self, prompt: &str, text: &str);
    fn focus_input_panel(&mut self);
    /// Replaces the input panel text and puts the cursor at end of line.
    fn set_input_text(&mut self, text: &str);

    fn status_message(&mut self, message: &str);
}

pub(crate) trait Environment {
    fn var(&self, name: &str) -> Option<String>;
    fn home_dir(&self) -> Option<PathBuf>;
    fn current_dir(&self) -> PathBuf;
    /// Root of the drive the process runs from, `/` on unix.
    fn root_dir(&self) -> PathBuf;
}

pub(crate) trait FileSystem {
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<DirEntry>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct OsEnvironment;

impl Environment for OsEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }

    fn current_dir(&self) -> PathBuf {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }

    fn root_dir(&self) -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.ancestors().last().map(Path::to_path_buf))
            .filter(|root| !root.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(std::path::MAIN_SEPARATOR_STR))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<DirEntry>> {
        let mut out = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            // `metadata` follows symlinks, so a link to a directory lists as one.
            let kind = if entry.path().is_dir() {
                EntryKind::Dir
            } else {
                EntryKind::File
            };
            out.push(DirEntry { name, kind });
        }
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }
}
