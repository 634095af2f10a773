//! The split pane that lists completion candidates below the other panes.

use tracing::{debug, warn};
use unicode_width::UnicodeWidthStr;

use crate::host::Window;
use crate::layout::PaneLayout;
use crate::paths::SEP;
use crate::types::{DirEntry, ViewId};

pub(crate) const DEFAULT_COLUMN_SPACING: usize = 2;
pub(crate) const DEFAULT_ROW_SHRINK: f64 = 0.75;

const EMPTY_LISTING: &str = "No files found in current directory";

pub(crate) fn column_count(width_chars: usize, longest: usize, spacing: usize) -> usize {
    (width_chars / (longest + spacing).max(1)).max(1)
}

/// Lays the entries out in fixed-width columns that fit `width_chars`.
pub(crate) fn render_listing(entries: &[DirEntry], width_chars: usize, spacing: usize) -> String {
    if entries.is_empty() {
        return EMPTY_LISTING.to_string();
    }
    let longest = entries
        .iter()
        .map(|e| e.name.width())
        .max()
        .unwrap_or(0);
    let columns = column_count(width_chars, longest, spacing);
    let cell_width = longest + spacing;

    let mut out = format!(
        "{} files in directory, possible completions are:\n\n",
        entries.len()
    );
    for (i, entry) in entries.iter().enumerate() {
        out.push_str(&entry.name);
        let mut used = entry.name.width();
        if entry.is_dir() {
            out.push(SEP);
            used += 1;
        }
        if (i + 1) % columns == 0 {
            out.push('\n');
        } else {
            out.push_str(&" ".repeat(cell_width.saturating_sub(used)));
        }
    }
    out
}

/// A scratch view created by one open-file session, together with the
/// layout it replaced.
#[derive(Debug)]
pub(crate) struct ScratchPane {
    view: ViewId,
    saved_layout: PaneLayout,
    saved_group: usize,
}

impl ScratchPane {
    /// Adds a full-width row at the bottom of the window and opens a scratch
    /// view in it. Input focus goes back to the panel afterwards.
    pub(crate) fn open(window: &mut dyn Window, row_shrink: f64) -> Self {
        let saved_layout = window.layout();
        let saved_group = window.active_group();
        let layout = saved_layout.with_bottom_row(row_shrink);
        let new_group = layout.cells.len() - 1;
        debug!(?layout, "adding scratch row");
        window.set_layout(layout);
        window.focus_group(new_group);
        let view = window.new_scratch_view();
        window.focus_input_panel();
        Self {
            view,
            saved_layout,
            saved_group,
        }
    }

    #[cfg(test)]
    pub(crate) fn view(&self) -> ViewId {
        self.view
    }

    pub(crate) fn clear(&self, window: &mut dyn Window) {
        window.set_read_only(self.view, false);
        if let Err(err) = window.set_view_text(self.view, "") {
            warn!(error = %err, "could not clear scratch listing");
        }
    }

    pub(crate) fn show(&self, window: &mut dyn Window, entries: &[DirEntry], spacing: usize) {
        let em = window.em_width(self.view);
        let width_chars = if em > 0.0 {
            (window.viewport_width(self.view) / em).floor() as usize
        } else {
            0
        };
        let text = render_listing(entries, width_chars, spacing);
        if let Err(err) = window.set_view_text(self.view, &text) {
            warn!(error = %err, "could not write scratch listing");
        }
        window.set_read_only(self.view, true);
    }

    /// Closes the scratch view and puts the saved layout back.
    pub(crate) fn close(self, window: &mut dyn Window) {
        if window.views().len() == 1 {
            // Never leave the window without a view.
            window.new_scratch_view();
        }
        window.focus_view(self.view);
        if window.active_view() == Some(self.view) {
            window.close_active_view();
        }
        debug!(layout = ?self.saved_layout, "restoring layout");
        window.set_layout(self.saved_layout);
        window.focus_group(self.saved_group);
    }
}
