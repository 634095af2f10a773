mod helpers;
mod overlays;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::App;
use crate::host::Window;
use crate::keybinds::KeyAction;
use crate::types::Focus;
use helpers::view_title_spans;
use overlays::{render_help, render_input_panel};

pub(crate) fn draw(app: &mut App, frame: &mut Frame<'_>) {
    let theme = app.theme.clone();
    let size = frame.area();
    let panel_height = if app.workspace.input_panel().is_some() { 3 } else { 0 };
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(panel_height),
            Constraint::Length(1),
        ])
        .split(size);
    // Viewport widths reported to the open-file command come from this area.
    app.workspace.set_area(vertical[1]);

    let active_label = app
        .workspace
        .active_view()
        .and_then(|id| app.workspace.view(id))
        .map(|view| match &view.path {
            Some(path) => path.display().to_string(),
            None => view.title(),
        })
        .unwrap_or_else(|| "no file".to_string());
    let top_text = format!(
        "tabopen   pane: {}/{}   file: {}   {} help",
        app.workspace.active_group() + 1,
        app.workspace.num_groups(),
        active_label,
        app.keybinds.display_for(KeyAction::Help),
    );
    let top = Paragraph::new(top_text)
        .style(Style::default().fg(theme.fg).bg(theme.bg_alt))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border)),
        );
    frame.render_widget(top, vertical[0]);

    let panes_focused = app.workspace.focus() == Focus::Panes;
    for (group, rect) in app.workspace.cell_rects().into_iter().enumerate() {
        let active = app.workspace.group_active_view(group);
        let titles: Vec<(String, bool)> = app
            .workspace
            .group_views(group)
            .iter()
            .filter_map(|id| app.workspace.view(*id))
            .map(|view| (view.title(), Some(view.id) == active))
            .collect();
        let border = if panes_focused && group == app.workspace.active_group() {
            theme.accent
        } else {
            theme.border
        };
        let text = active
            .and_then(|id| app.workspace.view(id))
            .map(|view| view.text.clone())
            .unwrap_or_default();
        let pane = Paragraph::new(text)
            .style(Style::default().fg(theme.fg).bg(theme.bg))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Line::from(view_title_spans(&titles, &theme)))
                    .border_style(Style::default().fg(border)),
            );
        frame.render_widget(pane, rect);
    }

    render_input_panel(app, vertical[2], frame);

    let status = Paragraph::new(app.workspace.status().to_string())
        .style(Style::default().fg(theme.fg_muted).bg(theme.bg_alt));
    frame.render_widget(status, vertical[3]);

    if app.help_open {
        render_help(app, frame);
    }
}
