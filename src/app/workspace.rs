use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ratatui::layout::Rect;
use tracing::debug;

use crate::error::OpenFileError;
use crate::host::Window;
use crate::layout::PaneLayout;
use crate::types::{Focus, ViewId};

#[derive(Debug, Clone)]
pub(crate) struct View {
    pub(crate) id: ViewId,
    pub(crate) path: Option<PathBuf>,
    pub(crate) text: String,
    pub(crate) scratch: bool,
    pub(crate) read_only: bool,
}

impl View {
    pub(crate) fn title(&self) -> String {
        match &self.path {
            Some(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            None if self.scratch => "scratch".to_string(),
            None => "untitled".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Group {
    views: Vec<ViewId>,
    active: Option<ViewId>,
}

impl Group {
    fn remove(&mut self, id: ViewId) -> bool {
        let Some(pos) = self.views.iter().position(|v| *v == id) else {
            return false;
        };
        self.views.remove(pos);
        if self.active == Some(id) {
            // The neighbour to the left takes over, like closing an editor tab.
            self.active = self.views.get(pos.saturating_sub(1)).copied();
        }
        true
    }
}

/// Single-line text entry docked at the bottom of the window. `cursor`
/// counts chars, not bytes.
#[derive(Debug, Clone)]
pub(crate) struct InputPanel {
    pub(crate) prompt: String,
    pub(crate) value: String,
    pub(crate) cursor: usize,
}

impl InputPanel {
    fn byte_index(&self, cursor: usize) -> usize {
        self.value
            .char_indices()
            .nth(cursor)
            .map_or(self.value.len(), |(i, _)| i)
    }

    pub(crate) fn len_chars(&self) -> usize {
        self.value.chars().count()
    }

    pub(crate) fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Puts `c` at the end of the line and moves the cursor after it.
    pub(crate) fn append(&mut self, c: char) {
        self.value.push(c);
        self.cursor = self.len_chars();
    }

    pub(crate) fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.value.remove(at);
        true
    }

    pub(crate) fn delete(&mut self) -> bool {
        if self.cursor >= self.len_chars() {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.value.remove(at);
        true
    }
}

/// The window model behind the terminal UI: views kept in groups, one group
/// per layout cell.
#[derive(Debug)]
pub(crate) struct Workspace {
    views: BTreeMap<ViewId, View>,
    groups: Vec<Group>,
    layout: PaneLayout,
    active_group: usize,
    panel: Option<InputPanel>,
    focus: Focus,
    status: String,
    area: Rect,
    next_id: u64,
}

impl Workspace {
    pub(crate) fn new(layout: PaneLayout, area: Rect) -> Self {
        let groups = vec![Group::default(); layout.cells.len().max(1)];
        Self {
            views: BTreeMap::new(),
            groups,
            layout,
            active_group: 0,
            panel: None,
            focus: Focus::Panes,
            status: String::new(),
            area,
            next_id: 1,
        }
    }

    pub(crate) fn set_area(&mut self, area: Rect) {
        self.area = area;
    }

    pub(crate) fn view(&self, id: ViewId) -> Option<&View> {
        self.views.get(&id)
    }

    pub(crate) fn group_of(&self, id: ViewId) -> Option<usize> {
        self.groups.iter().position(|g| g.views.contains(&id))
    }

    pub(crate) fn group_views(&self, group: usize) -> &[ViewId] {
        self.groups
            .get(group)
            .map(|g| g.views.as_slice())
            .unwrap_or_default()
    }

    pub(crate) fn group_active_view(&self, group: usize) -> Option<ViewId> {
        self.groups.get(group).and_then(|g| g.active)
    }

    pub(crate) fn cell_rects(&self) -> Vec<Rect> {
        self.layout.cell_rects(self.area)
    }

    pub(crate) fn focus(&self) -> Focus {
        self.focus
    }

    pub(crate) fn input_panel(&self) -> Option<&InputPanel> {
        self.panel.as_ref()
    }

    pub(crate) fn input_panel_mut(&mut self) -> Option<&mut InputPanel> {
        self.panel.as_mut()
    }

    pub(crate) fn input_text(&self) -> Option<&str> {
        self.panel.as_ref().map(|p| p.value.as_str())
    }

    /// Closes the panel and hands back its final state.
    pub(crate) fn hide_input_panel(&mut self) -> Option<InputPanel> {
        self.focus = Focus::Panes;
        self.panel.take()
    }

    pub(crate) fn status(&self) -> &str {
        &self.status
    }

    /// Focuses the next or previous group, wrapping at either end.
    pub(crate) fn cycle_group(&mut self, forward: bool) {
        let n = self.groups.len();
        let next = if forward {
            (self.active_group + 1) % n
        } else {
            (self.active_group + n - 1) % n
        };
        self.focus_group(next);
    }

    fn allocate_view(&mut self, path: Option<PathBuf>, text: String, scratch: bool) -> ViewId {
        let id = ViewId(self.next_id);
        self.next_id += 1;
        self.views.insert(
            id,
            View {
                id,
                path,
                text,
                scratch,
                read_only: false,
            },
        );
        let group = &mut self.groups[self.active_group];
        group.views.push(id);
        group.active = Some(id);
        self.focus = Focus::Panes;
        id
    }

    fn find_open(&self, path: &Path) -> Option<ViewId> {
        self.views
            .values()
            .find(|v| v.path.as_deref() == Some(path))
            .map(|v| v.id)
    }
}

impl Window for Workspace {
    fn layout(&self) -> PaneLayout {
        self.layout.clone()
    }

    fn set_layout(&mut self, layout: PaneLayout) {
        let count = layout.cells.len().max(1);
        if self.groups.len() > count {
            let orphans: Vec<Group> = self.groups.drain(count..).collect();
            let last = &mut self.groups[count - 1];
            for orphan in orphans {
                if last.active.is_none() {
                    last.active = orphan.active;
                }
                last.views.extend(orphan.views);
            }
        } else {
            self.groups.resize_with(count, Group::default);
        }
        self.active_group = self.active_group.min(count - 1);
        self.layout = layout;
    }

    fn num_groups(&self) -> usize {
        self.groups.len()
    }

    fn active_group(&self) -> usize {
        self.active_group
    }

    fn focus_group(&mut self, group: usize) {
        if group < self.groups.len() {
            self.active_group = group;
            self.focus = Focus::Panes;
        }
    }

    /// The moved view becomes the target group's active view. If it was the
    /// focused view, focus follows it.
    fn move_view_to_group(&mut self, view: ViewId, group: usize) {
        if group >= self.groups.len() {
            return;
        }
        let Some(from) = self.group_of(view) else {
            return;
        };
        let was_focused = self.active_view() == Some(view);
        self.groups[from].remove(view);
        let target = &mut self.groups[group];
        target.views.push(view);
        target.active = Some(view);
        if was_focused {
            self.active_group = group;
        }
        debug!(%view, from, group, "moved view");
    }

    fn views(&self) -> Vec<ViewId> {
        self.groups
            .iter()
            .flat_map(|g| g.views.iter().copied())
            .collect()
    }

    fn active_view(&self) -> Option<ViewId> {
        self.group_active_view(self.active_group)
    }

    fn focus_view(&mut self, view: ViewId) {
        if let Some(group) = self.group_of(view) {
            self.groups[group].active = Some(view);
            self.active_group = group;
            self.focus = Focus::Panes;
        }
    }

    fn close_active_view(&mut self) {
        let Some(view) = self.active_view() else {
            return;
        };
        self.groups[self.active_group].remove(view);
        self.views.remove(&view);
    }

    fn new_scratch_view(&mut self) -> ViewId {
        self.allocate_view(None, String::new(), true)
    }

    fn view_file_name(&self, view: ViewId) -> Option<PathBuf> {
        self.views.get(&view).and_then(|v| v.path.clone())
    }

    fn set_view_text(&mut self, view: ViewId, text: &str) -> Result<(), OpenFileError> {
        let v = self
            .views
            .get_mut(&view)
            .ok_or(OpenFileError::NoSuchView(view))?;
        if v.read_only {
            return Err(OpenFileError::ReadOnly(view));
        }
        v.text = text.to_string();
        Ok(())
    }

    fn set_read_only(&mut self, view: ViewId, read_only: bool) {
        if let Some(v) = self.views.get_mut(&view) {
            v.read_only = read_only;
        }
    }

    fn viewport_width(&self, view: ViewId) -> f32 {
        let Some(group) = self.group_of(view) else {
            return 0.0;
        };
        self.cell_rects()
            .get(group)
            .map_or(0.0, |rect| f32::from(rect.width.saturating_sub(2)))
    }

    fn em_width(&self, _view: ViewId) -> f32 {
        1.0
    }

    fn open_file(&mut self, path: &Path) -> Result<ViewId, OpenFileError> {
        if let Some(existing) = self.find_open(path) {
            self.focus_view(existing);
            return Ok(existing);
        }
        let meta = fs::metadata(path).map_err(|source| OpenFileError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        if !meta.is_file() {
            return Err(OpenFileError::NotAFile(path.to_path_buf()));
        }
        let bytes = fs::read(path).map_err(|source| OpenFileError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        Ok(self.allocate_view(Some(path.to_path_buf()), text, false))
    }

    fn show_input_panel(&mut self, prompt: &str, text: &str) {
        self.panel = Some(InputPanel {
            prompt: prompt.to_string(),
            value: text.to_string(),
            cursor: text.chars().count(),
        });
        self.focus = Focus::InputPanel;
    }

    fn focus_input_panel(&mut self) {
        if self.panel.is_some() {
            self.focus = Focus::InputPanel;
        }
    }

    fn set_input_text(&mut self, text: &str) {
        if let Some(panel) = self.panel.as_mut() {
            panel.value = text.to_string();
            panel.cursor = panel.len_chars();
        }
    }

    fn status_message(&mut self, message: &str) {
        self.status = message.to_string();
    }
}
