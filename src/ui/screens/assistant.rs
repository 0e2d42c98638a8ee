use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::ui::app::{App, ChatMessage, InputMode, Speaker};
use crate::ui::theme;

const USER_PREFIX: &str = "you › ";
const ASSISTANT_PREFIX: &str = "bot › ";

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(area);

    render_transcript(f, chunks[0], app);
    render_input(f, chunks[1], app);
}

/// Rows a message occupies once wrapped to `width` columns.
fn wrapped_height(message: &ChatMessage, width: usize) -> usize {
    let chars = USER_PREFIX.chars().count() + message.text.chars().count();
    chars.div_ceil(width.max(1)).max(1) + 1
}

fn render_transcript(f: &mut Frame, area: Rect, app: &App) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;

    // Newest messages that fit, oldest of those first
    let mut used = 0;
    let mut start = app.chat.len();
    for message in app.chat.iter().rev() {
        let h = wrapped_height(message, inner_width);
        if used + h > inner_height && start < app.chat.len() {
            break;
        }
        used += h;
        start -= 1;
    }

    let mut lines: Vec<Line> = Vec::new();
    for message in &app.chat[start..] {
        let (prefix, style) = match message.speaker {
            Speaker::User => (USER_PREFIX, theme::user_style()),
            Speaker::Assistant => (ASSISTANT_PREFIX, theme::assistant_style()),
        };
        lines.push(Line::from(vec![
            Span::styled(prefix, style),
            Span::styled(message.text.as_str(), theme::normal_style()),
        ]));
        lines.push(Line::from(""));
    }

    let transcript = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme::border_style())
            .title(Span::styled(" Assistant ", theme::title_style())),
    );
    f.render_widget(transcript, area);
}

fn render_input(f: &mut Frame, area: Rect, app: &App) {
    let active = app.input_mode == InputMode::Chat;
    let content = if active || !app.chat_input.is_empty() {
        Line::from(Span::styled(app.chat_input.as_str(), theme::normal_style()))
    } else {
        Line::from(Span::styled(
            "Press i or Enter to ask a question",
            theme::dim_style(),
        ))
    };

    let border = if active {
        theme::user_style()
    } else {
        theme::border_style()
    };
    let input = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(Span::styled(" Ask ", theme::title_style())),
    );
    f.render_widget(input, area);

    if active {
        let offset = app.chat_input.chars().count() as u16;
        let max = area.width.saturating_sub(2);
        f.set_cursor_position((area.x + 1 + offset.min(max), area.y + 1));
    }
}
