use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::settings::config_dir;

const KEYBINDS_FILE: &str = "keybinds.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum KeyAction {
    // Always available
    Quit,
    Help,
    // Panes
    OpenFile,
    OpenFileInline,
    CloseView,
    NextGroup,
    PrevGroup,
}

impl KeyAction {
    /// Global actions still fire while the input panel has focus.
    pub(crate) fn is_global(self) -> bool {
        matches!(self, KeyAction::Quit | KeyAction::Help)
    }

    pub(crate) fn all() -> &'static [KeyAction] {
        &[
            KeyAction::Quit,
            KeyAction::Help,
            KeyAction::OpenFile,
            KeyAction::OpenFileInline,
            KeyAction::CloseView,
            KeyAction::NextGroup,
            KeyAction::PrevGroup,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyScope {
    Global,
    Panes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KeyBind {
    pub(crate) modifiers: KeyModifiers,
    pub(crate) code: KeyCode,
}

impl KeyBind {
    /// Terminals report ctrl+letter as a control character on some platforms.
    pub(crate) fn normalize_char_with_modifiers(code: KeyCode, modifiers: KeyModifiers) -> KeyCode {
        match code {
            KeyCode::Char(c) if modifiers.contains(KeyModifiers::CONTROL) => {
                let u = c as u32;
                if (1..=26).contains(&u) {
                    KeyCode::Char((b'a' + (u as u8) - 1) as char)
                } else {
                    KeyCode::Char(c)
                }
            }
            other => other,
        }
    }

    pub(crate) fn parse(s: &str) -> Option<KeyBind> {
        let parts: Vec<&str> = s.split('+').collect();
        let (key_str, mods) = parts.split_last()?;
        let mut modifiers = KeyModifiers::NONE;
        for part in mods {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                "alt" => modifiers |= KeyModifiers::ALT,
                _ => return None,
            }
        }
        let lower = key_str.to_ascii_lowercase();
        let code = match lower.as_str() {
            "space" => KeyCode::Char(' '),
            "esc" | "escape" => KeyCode::Esc,
            "enter" | "return" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "backspace" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" => KeyCode::PageUp,
            "pagedown" => KeyCode::PageDown,
            other => {
                if let Some(n) = other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok())
                    && (1..=12).contains(&n)
                {
                    KeyCode::F(n)
                } else {
                    let mut chars = other.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => KeyCode::Char(c),
                        _ => return None,
                    }
                }
            }
        };
        Some(KeyBind { modifiers, code })
    }

    fn key_name(&self) -> String {
        match self.code {
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyCode::F(n) => format!("F{n}"),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::Delete => "Delete".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            KeyCode::PageUp => "PageUp".to_string(),
            KeyCode::PageDown => "PageDown".to_string(),
            _ => "?".to_string(),
        }
    }

    /// Human readable form for the help overlay, e.g. `Ctrl+O`.
    pub(crate) fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        parts.push(self.key_name());
        parts.join("+")
    }

    pub(crate) fn matches(&self, key: &KeyEvent) -> bool {
        let bind_code = KeyBind::normalize_char_with_modifiers(self.code, self.modifiers);
        let ev_code = KeyBind::normalize_char_with_modifiers(key.code, key.modifiers);
        let lower = |code: KeyCode| match code {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        };
        // Shift only changes the case of a letter, which is compared lowercased.
        let strip_shift = |code: KeyCode, mods: KeyModifiers| {
            if matches!(code, KeyCode::Char(_)) {
                mods - KeyModifiers::SHIFT
            } else {
                mods
            }
        };
        lower(ev_code) == lower(bind_code)
            && strip_shift(ev_code, key.modifiers) == strip_shift(bind_code, self.modifiers)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct KeyBindings {
    pub(crate) map: HashMap<KeyAction, Vec<KeyBind>>,
}

impl KeyBindings {
    pub(crate) fn defaults() -> Self {
        let mut map: HashMap<KeyAction, Vec<KeyBind>> = HashMap::new();
        let defaults = [
            (KeyAction::Quit, "ctrl+q"),
            (KeyAction::Help, "f4"),
            (KeyAction::OpenFile, "ctrl+o"),
            (KeyAction::OpenFileInline, "alt+o"),
            (KeyAction::CloseView, "ctrl+w"),
            (KeyAction::NextGroup, "f2"),
            (KeyAction::PrevGroup, "f1"),
        ];
        for (action, s) in defaults {
            if let Some(bind) = KeyBind::parse(s) {
                map.entry(action).or_default().push(bind);
            }
        }
        KeyBindings { map }
    }

    /// First action in [`KeyAction::all`] order whose binding matches. The
    /// `Global` scope only sees global actions, `Panes` sees everything.
    pub(crate) fn lookup(&self, key: &KeyEvent, scope: KeyScope) -> Option<KeyAction> {
        KeyAction::all()
            .iter()
            .copied()
            .filter(|action| scope == KeyScope::Panes || action.is_global())
            .find(|action| {
                self.map
                    .get(action)
                    .is_some_and(|binds| binds.iter().any(|b| b.matches(key)))
            })
    }

    pub(crate) fn display_for(&self, action: KeyAction) -> String {
        self.map
            .get(&action)
            .and_then(|v| v.first())
            .map(|b| b.display())
            .unwrap_or_else(|| "unbound".to_string())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SingleOrVec {
    Single(String),
    Multiple(Vec<String>),
}

pub(crate) fn keybinds_file_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(KEYBINDS_FILE))
}

pub(crate) fn parse_key_action_name(name: &str) -> Option<KeyAction> {
    serde_json::from_value::<KeyAction>(serde_json::Value::String(name.to_string())).ok()
}

pub(crate) fn apply_keybinding_overrides(
    kb: &mut KeyBindings,
    overrides: HashMap<String, SingleOrVec>,
    source: &str,
) {
    for (action_name, val) in overrides {
        let Some(action) = parse_key_action_name(&action_name) else {
            warn!(source, action = %action_name, "unknown key action");
            continue;
        };
        let strings = match val {
            SingleOrVec::Single(s) => vec![s],
            SingleOrVec::Multiple(v) => v,
        };
        if strings.is_empty() {
            // "quit": [] unbinds
            kb.map.insert(action, Vec::new());
            continue;
        }
        let (binds, invalid): (Vec<_>, Vec<_>) = strings
            .into_iter()
            .map(|s| KeyBind::parse(&s).ok_or(s))
            .partition(Result::is_ok);
        let binds: Vec<KeyBind> = binds.into_iter().filter_map(Result::ok).collect();
        let invalid: Vec<String> = invalid.into_iter().filter_map(Result::err).collect();
        if !invalid.is_empty() {
            warn!(
                source,
                action = %action_name,
                binds = %invalid.join(", "),
                "invalid key binding"
            );
        }
        if !binds.is_empty() {
            kb.map.insert(action, binds);
        }
    }
}

pub(crate) fn parse_override_entry(
    action_name: &str,
    raw: serde_json::Value,
    source: &str,
) -> Option<(String, SingleOrVec)> {
    match raw {
        serde_json::Value::String(s) => Some((action_name.to_string(), SingleOrVec::Single(s))),
        serde_json::Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let serde_json::Value::String(s) = item else {
                    warn!(source, action = action_name, "key binding list items must be strings");
                    return None;
                };
                out.push(s);
            }
            Some((action_name.to_string(), SingleOrVec::Multiple(out)))
        }
        _ => {
            warn!(
                source,
                action = action_name,
                "key binding must be a string or an array of strings"
            );
            None
        }
    }
}

pub(crate) fn load_keybindings() -> KeyBindings {
    match keybinds_file_path() {
        Some(path) => load_keybindings_from(&path),
        None => KeyBindings::defaults(),
    }
}

pub(crate) fn load_keybindings_from(path: &std::path::Path) -> KeyBindings {
    let mut kb = KeyBindings::defaults();
    let Ok(raw) = fs::read_to_string(path) else {
        return kb;
    };
    let source = path.display().to_string();
    let Ok(root) = serde_json::from_str::<serde_json::Value>(&raw) else {
        warn!(source, "invalid key bindings json");
        return kb;
    };
    let Some(obj) = root.as_object() else {
        warn!(source, "key bindings json must be an object");
        return kb;
    };
    let overrides: HashMap<String, SingleOrVec> = obj
        .iter()
        .filter_map(|(name, raw_val)| parse_override_entry(name, raw_val.clone(), &source))
        .collect();
    apply_keybinding_overrides(&mut kb, overrides, &source);
    kb
}
