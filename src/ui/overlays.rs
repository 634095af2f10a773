use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph, Wrap};

use crate::app::App;
use crate::keybinds::KeyAction;
use crate::types::Focus;

use super::helpers::{centered_rect, cursor_column, help_keybind_line, themed_block};

pub(crate) fn render_input_panel(app: &App, area: Rect, frame: &mut Frame<'_>) {
    let Some(panel) = app.workspace.input_panel() else {
        return;
    };
    let theme = &app.theme;
    frame.render_widget(Clear, area);
    // Tabs only ever sit at the ends while a completion runs; show them as spaces.
    let shown = panel.value.replace('\t', " ");
    let input = Paragraph::new(shown).block(
        themed_block(theme)
            .title(panel.prompt.as_str())
            .style(Style::default().bg(theme.bg_alt).fg(theme.fg)),
    );
    frame.render_widget(input, area);
    if app.workspace.focus() == Focus::InputPanel {
        let cursor_x = area
            .x
            .saturating_add(1)
            .saturating_add(cursor_column(&panel.value, panel.cursor));
        if cursor_x < area.right() {
            frame.set_cursor_position((cursor_x, area.y + 1));
        }
    }
}

pub(crate) fn render_help(app: &App, frame: &mut Frame<'_>) {
    let theme = &app.theme;
    let area = centered_rect(70, 60, frame.area());
    frame.render_widget(Clear, area);

    let kb = &app.keybinds;
    let heading = Style::default()
        .fg(theme.accent)
        .add_modifier(Modifier::BOLD);
    let key_s = Style::default().fg(theme.accent);
    let desc_s = Style::default().fg(theme.fg);
    let sep_s = Style::default().fg(theme.fg_muted);
    let muted = Style::default().fg(theme.fg_muted);

    let lines: Vec<Line> = vec![
        Line::from(Span::styled("Panes", heading)),
        Line::from(""),
        help_keybind_line(
            &[
                (&kb.display_for(KeyAction::OpenFile), "open file"),
                (
                    &kb.display_for(KeyAction::OpenFileInline),
                    "open file, list matches inline",
                ),
            ],
            key_s,
            desc_s,
            sep_s,
        ),
        help_keybind_line(
            &[
                (&kb.display_for(KeyAction::NextGroup), "next pane"),
                (&kb.display_for(KeyAction::PrevGroup), "previous pane"),
                (&kb.display_for(KeyAction::CloseView), "close view"),
            ],
            key_s,
            desc_s,
            sep_s,
        ),
        help_keybind_line(
            &[
                (&kb.display_for(KeyAction::Help), "help"),
                (&kb.display_for(KeyAction::Quit), "quit"),
            ],
            key_s,
            desc_s,
            sep_s,
        ),
        Line::from(""),
        Line::from(Span::styled("Open file panel", heading)),
        Line::from(""),
        help_keybind_line(
            &[
                ("Tab", "complete path"),
                ("Enter", "open"),
                ("Esc", "cancel"),
            ],
            key_s,
            desc_s,
            sep_s,
        ),
        Line::from(Span::styled(
            "Tab twice on an ambiguous name lists the matches. $VAR and ~ expand.",
            muted,
        )),
        Line::from(Span::styled(
            "Deleting a trailing separator climbs to the parent directory.",
            muted,
        )),
    ];

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(theme.fg).bg(theme.bg_alt))
        .block(themed_block(theme).title("Help (Esc to close)"));
    frame.render_widget(body, area);
}
