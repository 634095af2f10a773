use crate::keybinds::KeyBindings;
use crate::session::{OpenFileSession, SessionOptions};
use crate::theme::Theme;

mod core;
mod input;
mod workspace;

pub(crate) use workspace::Workspace;

pub(crate) struct App {
    pub(crate) workspace: Workspace,
    /// Present while the open-file panel is showing.
    pub(crate) session: Option<OpenFileSession>,
    pub(crate) options: SessionOptions,
    pub(crate) keybinds: KeyBindings,
    pub(crate) theme: Theme,
    pub(crate) help_open: bool,
    pub(crate) quit: bool,
}
