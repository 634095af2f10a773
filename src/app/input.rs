use super::App;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::completion::COMPLETION_MARKER;
use crate::host::Window;
use crate::keybinds::KeyScope;

impl App {
    pub(crate) fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.help_open {
            self.handle_help_key(key);
            return;
        }

        if self.workspace.input_panel().is_some() {
            if let Some(action) = self.keybinds.lookup(&key, KeyScope::Global) {
                self.run_key_action(action);
                return;
            }
            self.handle_panel_key(key);
            return;
        }

        if let Some(action) = self.keybinds.lookup(&key, KeyScope::Panes) {
            self.run_key_action(action);
        }
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        if let Some(action) = self.keybinds.lookup(&key, KeyScope::Global) {
            self.run_key_action(action);
            return;
        }
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
            self.help_open = false;
        }
    }

    fn handle_panel_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.cancel_open_file();
                return;
            }
            KeyCode::Enter => {
                self.confirm_open_file();
                return;
            }
            _ => {}
        }
        self.workspace.focus_input_panel();
        let Some(panel) = self.workspace.input_panel_mut() else {
            return;
        };
        let changed = match key.code {
            KeyCode::Tab => {
                panel.append(COMPLETION_MARKER);
                true
            }
            KeyCode::Backspace => panel.backspace(),
            KeyCode::Delete => panel.delete(),
            KeyCode::Left => {
                panel.cursor = panel.cursor.saturating_sub(1);
                false
            }
            KeyCode::Right => {
                panel.cursor = (panel.cursor + 1).min(panel.len_chars());
                false
            }
            KeyCode::Home => {
                panel.cursor = 0;
                false
            }
            KeyCode::End => {
                panel.cursor = panel.len_chars();
                false
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                panel.insert(c);
                true
            }
            _ => false,
        };
        if changed {
            self.input_changed();
        }
    }
}
