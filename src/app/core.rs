use std::path::PathBuf;

use ratatui::layout::Rect;
use tracing::{info, warn};

use super::{App, Workspace};
use crate::host::{OsEnvironment, OsFileSystem, Window};
use crate::keybinds::{KeyAction, KeyBindings};
use crate::session::{OpenFileSession, SessionOptions};
use crate::settings::Settings;
use crate::theme::Theme;

impl App {
    pub(crate) fn new(settings: &Settings, keybinds: KeyBindings) -> Self {
        Self {
            workspace: Workspace::new(settings.layout.clone(), Rect::default()),
            session: None,
            options: SessionOptions::from_settings(settings),
            keybinds,
            theme: Theme::from_colors(&settings.theme),
            help_open: false,
            quit: false,
        }
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        self.workspace.status_message(&msg);
    }

    /// Opens files named on the command line, each in the active group.
    pub(crate) fn open_paths(&mut self, paths: &[PathBuf]) {
        for path in paths {
            match self.workspace.open_file(path) {
                Ok(view) => info!(path = %path.display(), %view, "opened from command line"),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "could not open");
                    self.set_status(err.to_string());
                }
            }
        }
    }

    pub(crate) fn start_open_file(&mut self, inline: bool) {
        if self.session.is_some() {
            self.workspace.focus_input_panel();
            return;
        }
        let mut options = self.options;
        if inline {
            options.use_scratch_buffer = false;
        }
        self.set_status("");
        self.session = Some(OpenFileSession::start(
            &mut self.workspace,
            options,
            OsEnvironment,
            OsFileSystem,
        ));
    }

    pub(crate) fn confirm_open_file(&mut self) {
        let Some(panel) = self.workspace.hide_input_panel() else {
            return;
        };
        if let Some(session) = self.session.take() {
            session.on_done(&panel.value, &mut self.workspace);
        }
    }

    pub(crate) fn cancel_open_file(&mut self) {
        self.workspace.hide_input_panel();
        if let Some(session) = self.session.take() {
            session.on_cancel(&mut self.workspace);
        }
    }

    /// Reports the panel's current text to the session after an edit.
    pub(crate) fn input_changed(&mut self) {
        let Some(text) = self.workspace.input_text().map(str::to_string) else {
            return;
        };
        if let Some(session) = self.session.as_mut() {
            session.on_change(&text, &mut self.workspace);
        }
    }

    pub(crate) fn request_quit(&mut self) {
        // The panel owns a scratch row; put the layout back before leaving.
        self.cancel_open_file();
        self.quit = true;
    }

    pub(crate) fn run_key_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::Quit => self.request_quit(),
            KeyAction::Help => self.help_open = !self.help_open,
            KeyAction::OpenFile => self.start_open_file(false),
            KeyAction::OpenFileInline => self.start_open_file(true),
            KeyAction::CloseView => {
                if self.workspace.active_view().is_some() {
                    self.workspace.close_active_view();
                } else {
                    self.set_status("No view to close");
                }
            }
            KeyAction::NextGroup => self.workspace.cycle_group(true),
            KeyAction::PrevGroup => self.workspace.cycle_group(false),
        }
    }
}
