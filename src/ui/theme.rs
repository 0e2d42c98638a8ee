use ratatui::style::{Color, Modifier, Style};

// Nord palette
pub(crate) const HEADER_BG: Color = Color::Rgb(46, 52, 64);
pub(crate) const HEADER_FG: Color = Color::Rgb(236, 239, 244);
pub(crate) const ACCENT: Color = Color::Rgb(136, 192, 208);
pub(crate) const GREEN: Color = Color::Rgb(163, 190, 140);
pub(crate) const RED: Color = Color::Rgb(191, 97, 106);
pub(crate) const YELLOW: Color = Color::Rgb(235, 203, 139);
pub(crate) const MAUVE: Color = Color::Rgb(180, 142, 173);
pub(crate) const SURFACE: Color = Color::Rgb(59, 66, 82);
pub(crate) const TEXT: Color = Color::Rgb(229, 233, 240);
pub(crate) const TEXT_DIM: Color = Color::Rgb(129, 161, 193);
pub(crate) const OVERLAY: Color = Color::Rgb(76, 86, 106);
pub(crate) const COMMAND_BG: Color = Color::Rgb(36, 41, 51);

pub(crate) fn header_style() -> Style {
    Style::default()
        .fg(HEADER_FG)
        .bg(HEADER_BG)
        .add_modifier(Modifier::BOLD)
}

/// Block titles: dim and bold.
pub(crate) fn title_style() -> Style {
    Style::default().fg(TEXT_DIM).add_modifier(Modifier::BOLD)
}

pub(crate) fn border_style() -> Style {
    Style::default().fg(OVERLAY)
}

pub(crate) fn selected_style() -> Style {
    Style::default().fg(HEADER_BG).bg(ACCENT)
}

pub(crate) fn normal_style() -> Style {
    Style::default().fg(TEXT)
}

pub(crate) fn dim_style() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub(crate) fn amount_style() -> Style {
    Style::default().fg(RED)
}

pub(crate) fn alt_row_style() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub(crate) fn user_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub(crate) fn assistant_style() -> Style {
    Style::default().fg(MAUVE).add_modifier(Modifier::BOLD)
}

pub(crate) fn command_bar_style() -> Style {
    Style::default().fg(TEXT).bg(COMMAND_BG)
}

pub(crate) fn status_bar_style() -> Style {
    Style::default().fg(TEXT_DIM).bg(SURFACE)
}

/// Mode badge in the status bar, colored per input mode.
pub(crate) fn badge_style(bg: Color) -> Style {
    Style::default()
        .fg(HEADER_BG)
        .bg(bg)
        .add_modifier(Modifier::BOLD)
}
