use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};
use std::collections::BTreeMap;

use super::app::{App, InputMode, Screen};
use super::commands;
use super::theme;
use super::util::month_title;

/// Key bindings shown in the help overlay, two per row.
const KEYS: &[(&str, &str)] = &[
    ("j/k, Up/Down", "Move cursor"),
    ("1-3, Tab", "Switch screen"),
    ("g / G", "First / last row"),
    ("Ctrl-d / Ctrl-u", "Half page down / up"),
    ("H / L", "Previous / next month"),
    ("a", "Add expense"),
    ("e, Enter", "Edit selected"),
    ("D", "Delete selected"),
    ("i", "Ask the assistant"),
    ("/", "Live search"),
    (":", "Command mode"),
    ("Esc", "Cancel, clear filters"),
    ("?", "This help"),
    ("Ctrl-q", "Quit"),
];

pub(crate) fn render(f: &mut Frame, app: &App) {
    let [tabs, body, status, command] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(5),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(f.area());

    render_tabs(f, tabs, app);
    match app.screen {
        Screen::Dashboard => super::screens::dashboard::render(f, body, app),
        Screen::Expenses => super::screens::expenses::render(f, body, app),
        Screen::Assistant => super::screens::assistant::render(f, body, app),
    }
    render_status(f, status, app);
    render_prompt(f, command, app);

    if app.show_help {
        render_help(f);
    }
}

fn render_tabs(f: &mut Frame, area: Rect, app: &App) {
    let titles = Screen::all()
        .iter()
        .enumerate()
        .map(|(i, screen)| Line::from(format!("{}:{screen}", i + 1)));
    let selected = Screen::all()
        .iter()
        .position(|s| *s == app.screen)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(theme::dim_style().bg(theme::HEADER_BG))
        .highlight_style(Style::default().fg(theme::ACCENT).add_modifier(Modifier::BOLD))
        .divider(Span::styled("│", theme::border_style()));
    f.render_widget(tabs, area);
}

fn mode_color(mode: InputMode) -> Color {
    match mode {
        InputMode::Normal => theme::ACCENT,
        InputMode::Command | InputMode::Editing => theme::GREEN,
        InputMode::Search => theme::YELLOW,
        InputMode::Confirm => theme::RED,
        InputMode::Chat => theme::MAUVE,
    }
}

fn render_status(f: &mut Frame, area: Rect, app: &App) {
    let hints = match app.screen {
        Screen::Dashboard => "H/L month  :add  :seed  ? help ",
        Screen::Expenses => "e edit  D delete  / search  ? help ",
        Screen::Assistant => "i ask  Esc leave  ? help ",
    };
    let [left, right] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(hints.chars().count() as u16),
    ])
    .areas(area);

    let left_line = Line::from(vec![
        Span::styled(
            format!(" {} ", app.input_mode),
            theme::badge_style(mode_color(app.input_mode)),
        ),
        Span::raw(format!(
            " {} · {} · {} expenses",
            app.screen,
            month_title(app.month),
            app.expense_count
        )),
    ]);
    f.render_widget(
        Paragraph::new(left_line).style(theme::status_bar_style()),
        left,
    );
    f.render_widget(
        Paragraph::new(hints).style(theme::status_bar_style()),
        right,
    );
}

/// Prompt line with the cursor parked after the typed text.
fn prompt<'a>(f: &mut Frame, area: Rect, label: Span<'a>, text: &'a str, extra: Span<'a>) {
    let offset = label.width() + text.chars().count();
    let line = Line::from(vec![
        label,
        Span::styled(text, theme::command_bar_style()),
        extra,
    ]);
    f.render_widget(Paragraph::new(line).style(theme::command_bar_style()), area);
    let x = area.x.saturating_add(offset as u16).min(area.right().saturating_sub(1));
    f.set_cursor_position((x, area.y));
}

fn render_prompt(f: &mut Frame, area: Rect, app: &App) {
    match app.input_mode {
        InputMode::Command => prompt(
            f,
            area,
            Span::styled(":", Style::default().fg(theme::ACCENT)),
            &app.command_input,
            Span::raw(""),
        ),
        InputMode::Search => {
            let matches = if app.search_input.is_empty() {
                Span::raw("")
            } else {
                Span::styled(format!("  {} matching", app.expenses.len()), theme::dim_style())
            };
            prompt(
                f,
                area,
                Span::styled("/", Style::default().fg(theme::YELLOW)),
                &app.search_input,
                matches,
            );
        }
        InputMode::Editing => {
            let label = app
                .editing_id
                .map_or_else(|| "new> ".to_string(), |id| format!("edit #{id}> "));
            prompt(
                f,
                area,
                Span::styled(label, Style::default().fg(theme::GREEN)),
                &app.command_input,
                Span::raw(""),
            );
        }
        InputMode::Confirm => {
            let line = Line::from(vec![
                Span::styled(app.confirm_message.as_str(), Style::default().fg(theme::YELLOW)),
                Span::styled(" y to confirm, any other key cancels", theme::dim_style()),
            ]);
            f.render_widget(Paragraph::new(line).style(theme::command_bar_style()), area);
        }
        InputMode::Normal | InputMode::Chat => {
            let line = if app.status_message.is_empty() {
                Line::styled(" : command  / search  ? help", theme::dim_style())
            } else {
                Line::styled(app.status_message.as_str(), theme::command_bar_style())
            };
            f.render_widget(Paragraph::new(line).style(theme::command_bar_style()), area);
        }
    }
}

fn heading(title: &str) -> Line<'static> {
    Line::styled(
        format!(" {title}"),
        Style::default().fg(theme::YELLOW).add_modifier(Modifier::BOLD),
    )
}

fn render_help(f: &mut Frame) {
    let mut lines = vec![heading("Keys")];
    for pair in KEYS.chunks(2) {
        let mut spans = Vec::new();
        for (key, what) in pair {
            spans.push(Span::styled(format!("  {key:<16}"), theme::user_style()));
            spans.push(Span::styled(format!("{what:<22}"), theme::normal_style()));
        }
        lines.push(Line::from(spans));
    }

    // One line per command; aliases share the description of their full name
    let mut by_description: BTreeMap<&str, &str> = BTreeMap::new();
    for (&name, cmd) in commands::COMMANDS.iter() {
        let entry = by_description.entry(cmd.description).or_insert(name);
        if name.len() > entry.len() {
            *entry = name;
        }
    }
    let mut entries: Vec<(&str, &str)> = by_description
        .into_iter()
        .map(|(description, name)| (name, description))
        .collect();
    entries.sort_unstable();

    lines.push(Line::from(""));
    lines.push(heading("Commands"));
    lines.extend(entries.into_iter().map(|(name, description)| {
        Line::from(vec![
            Span::styled(format!("  :{name:<15}"), theme::user_style()),
            Span::styled(description, theme::normal_style()),
        ])
    }));
    lines.push(Line::from(""));
    lines.push(Line::styled(" any key closes this window", theme::dim_style()));

    let area = f.area();
    let height = (lines.len() as u16 + 2).min(area.height);
    let [popup] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Length(80.min(area.width))])
        .flex(Flex::Center)
        .areas(popup);

    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(" Spendboard ", theme::title_style()))
                .border_style(Style::default().fg(theme::ACCENT))
                .style(Style::default().bg(theme::HEADER_BG)),
        ),
        popup,
    );
}
