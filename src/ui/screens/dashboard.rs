use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Sparkline},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, month_title, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // KPI cards
            Constraint::Min(10),   // Bar charts
            Constraint::Length(5), // Daily sparkline
        ])
        .split(area);

    render_kpi_cards(f, chunks[0], app);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    render_category_chart(f, charts[0], app);
    render_monthly_chart(f, charts[1], app);

    render_daily_sparkline(f, chunks[2], app);
}

fn render_kpi_cards(f: &mut Frame, area: Rect, app: &App) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let kpis = &app.dashboard.kpis;
    let count = kpis.expense_count;

    render_card(
        f,
        cards[0],
        "This Month",
        format_amount(kpis.month_total),
        theme::RED,
        format!("{count} expense{}", if count == 1 { "" } else { "s" }),
    );
    render_card(
        f,
        cards[1],
        "Daily Average",
        format_amount(kpis.average_daily),
        theme::YELLOW,
        format!("last {} days", app.daily_window),
    );
    let (top_name, top_amount) = match &kpis.top_category {
        Some((name, amount)) => (truncate(name, 18), format_amount(*amount)),
        None => ("none yet".to_string(), "-".to_string()),
    };
    render_card(f, cards[2], "Top Category", top_amount, theme::MAUVE, top_name);
    render_card(
        f,
        cards[3],
        "All Records",
        app.expense_count.to_string(),
        theme::ACCENT,
        format!("{} categories", app.categories.len()),
    );
}

fn render_card(f: &mut Frame, area: Rect, title: &str, value: String, color: Color, subtitle: String) {
    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(subtitle, theme::dim_style())),
    ])
    .centered()
    .block(titled_block(title));

    f.render_widget(text, area);
}

fn titled_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme::border_style())
        .title(Span::styled(format!(" {title} "), theme::title_style()))
}

/// Bars and sparklines take whole units.
fn bar_value(amount: Decimal) -> u64 {
    amount.round().to_u64().unwrap_or(0)
}

fn render_category_chart(f: &mut Frame, area: Rect, app: &App) {
    let title = format!("Spending by Category · {}", month_title(app.month));
    let groups = &app.dashboard.by_category;

    if groups.is_empty() {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("No expenses this month", theme::dim_style())),
            Line::from(Span::styled(
                "Add one with :add or load samples with :seed",
                theme::dim_style(),
            )),
        ])
        .centered()
        .block(titled_block(&title));
        f.render_widget(msg, area);
        return;
    }

    let bars: Vec<Bar> = groups
        .iter()
        .take(8)
        .map(|(name, amount)| {
            Bar::default()
                .value(bar_value(*amount))
                .text_value(format!("{:.0}", amount))
                .label(Line::from(truncate(name, 9)))
                .style(Style::default().fg(theme::ACCENT))
                .value_style(
                    Style::default()
                        .fg(theme::HEADER_BG)
                        .bg(theme::ACCENT)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    let chart = BarChart::default()
        .block(titled_block(&title))
        .data(BarGroup::default().bars(&bars))
        .bar_width(9)
        .bar_gap(1);

    f.render_widget(chart, area);
}

fn render_monthly_chart(f: &mut Frame, area: Rect, app: &App) {
    let monthly = &app.dashboard.monthly;
    if monthly.is_empty() {
        let msg = Paragraph::new(Line::from(Span::styled(
            "Monthly window is disabled",
            theme::dim_style(),
        )))
        .centered()
        .block(titled_block("Monthly Spending"));
        f.render_widget(msg, area);
        return;
    }

    let bars: Vec<Bar> = monthly
        .iter()
        .map(|(label, amount)| {
            // "Jul 2025" → "Jul 25"
            let short = match label.split_once(' ') {
                Some((month, year)) => format!("{month} {}", &year[year.len().saturating_sub(2)..]),
                None => label.to_string(),
            };
            Bar::default()
                .value(bar_value(amount))
                .text_value(format!("{:.0}", amount))
                .label(Line::from(short))
                .style(Style::default().fg(theme::GREEN))
                .value_style(
                    Style::default()
                        .fg(theme::HEADER_BG)
                        .bg(theme::GREEN)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    let title = format!(
        "Last {} Months · {}",
        monthly.len(),
        format_amount(monthly.total())
    );
    let chart = BarChart::default()
        .block(titled_block(&title))
        .data(BarGroup::default().bars(&bars))
        .bar_width(7)
        .bar_gap(1);

    f.render_widget(chart, area);
}

fn render_daily_sparkline(f: &mut Frame, area: Rect, app: &App) {
    let daily = &app.dashboard.daily;
    let data: Vec<u64> = daily.values.iter().map(|v| bar_value(*v)).collect();

    let span = match (daily.labels.first(), daily.labels.last()) {
        (Some(first), Some(last)) => format!("{first} – {last}"),
        _ => String::from("no window"),
    };
    let title = format!("Daily Spending · {span}");

    let sparkline = Sparkline::default()
        .block(titled_block(&title))
        .data(&data)
        .style(Style::default().fg(theme::YELLOW));

    f.render_widget(sparkline, area);
}
