use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::layout::PaneLayout;
use crate::scratch::{DEFAULT_COLUMN_SPACING, DEFAULT_ROW_SHRINK};
use crate::theme::ThemeColors;

const APP_DIR: &str = "tabopen";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) use_scratch_buffer: bool,
    pub(crate) scratch_column_spacing: usize,
    pub(crate) scratch_row_shrink: f64,
    pub(crate) layout: PaneLayout,
    pub(crate) theme: ThemeColors,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_scratch_buffer: true,
            scratch_column_spacing: DEFAULT_COLUMN_SPACING,
            scratch_row_shrink: DEFAULT_ROW_SHRINK,
            layout: PaneLayout::default(),
            theme: ThemeColors::default(),
        }
    }
}

impl Settings {
    /// Replaces values that would break the layout with their defaults.
    fn sanitized(mut self, source: &str) -> Self {
        if !(self.scratch_row_shrink > 0.0 && self.scratch_row_shrink < 1.0) {
            warn!(
                source,
                value = self.scratch_row_shrink,
                "scratch_row_shrink must be between 0 and 1, using default"
            );
            self.scratch_row_shrink = DEFAULT_ROW_SHRINK;
        }
        if !self.layout.is_valid() {
            warn!(source, layout = ?self.layout, "invalid layout, using a single pane");
            self.layout = PaneLayout::default();
        }
        self
    }
}

/// `<config>/tabopen`, where `<config>` is `XDG_CONFIG_HOME`, `APPDATA` or
/// `~/.config`, in that order.
pub(crate) fn config_dir() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME")
        && !xdg.is_empty()
    {
        return Some(PathBuf::from(xdg).join(APP_DIR));
    }
    if let Ok(appdata) = std::env::var("APPDATA")
        && !appdata.is_empty()
    {
        return Some(PathBuf::from(appdata).join(APP_DIR));
    }
    dirs::home_dir().map(|home| home.join(".config").join(APP_DIR))
}

pub(crate) fn settings_file_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(SETTINGS_FILE))
}

pub(crate) fn load_settings() -> Settings {
    match settings_file_path() {
        Some(path) => load_settings_from(&path),
        None => Settings::default(),
    }
}

pub(crate) fn load_settings_from(path: &Path) -> Settings {
    let Ok(raw) = fs::read_to_string(path) else {
        return Settings::default();
    };
    let source = path.display().to_string();
    match serde_json::from_str::<Settings>(&raw) {
        Ok(settings) => settings.sanitized(&source),
        Err(err) => {
            warn!(source, error = %err, "invalid settings json, using defaults");
            Settings::default()
        }
    }
}

pub(crate) fn save_settings_to(path: &Path, settings: &Settings) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let raw = serde_json::to_string_pretty(settings)
        .map_err(|e| io::Error::other(format!("serialize settings: {e}")))?;
    fs::write(path, raw)
}
