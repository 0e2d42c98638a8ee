use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use rust_decimal::Decimal;

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, month_title, truncate};

fn title(app: &App) -> String {
    let mut title = format!(" Expenses · {} ({})", month_title(app.month), app.expenses.len());
    if let Some(category) = &app.category_filter {
        title.push_str(&format!(" category: {category}"));
    }
    if !app.search_input.is_empty() {
        title.push_str(&format!(" search: '{}'", app.search_input));
    }
    title.push(' ');
    title
}

fn block(app: &App) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme::border_style())
        .title(Span::styled(title(app), theme::title_style()))
}

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    if app.expenses.is_empty() {
        let hint = if app.search_input.is_empty() && app.category_filter.is_none() {
            "Add one with :add, or :seed to load samples"
        } else {
            "Press Esc or :category to clear the filters"
        };
        let msg = vec![
            Line::from(""),
            Line::from(Span::styled("No expenses to show", theme::dim_style())),
            Line::from(""),
            Line::from(Span::styled(hint, theme::dim_style())),
        ];
        f.render_widget(Paragraph::new(msg).centered().block(block(app)), area);
        return;
    }

    let header_cells = ["#", "Date", "Description", "Category", "Amount"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .expenses
        .iter()
        .enumerate()
        .skip(app.expense_scroll)
        .take(area.height.saturating_sub(4) as usize)
        .map(|(i, expense)| {
            let style = if i == app.expense_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            Row::new(vec![
                Cell::from(Span::styled(expense.id.to_string(), theme::dim_style())),
                Cell::from(expense.date_str()),
                Cell::from(truncate(&expense.description, 40)),
                Cell::from(truncate(&expense.category, 18)),
                Cell::from(Span::styled(
                    format_amount(expense.amount),
                    theme::amount_style(),
                )),
            ])
            .style(style)
        })
        .collect();

    let total: Decimal = app.expenses.iter().map(|e| e.amount).sum();
    let footer = Row::new(vec![
        Cell::from(""),
        Cell::from(""),
        Cell::from(""),
        Cell::from(Span::styled("Total", theme::title_style())),
        Cell::from(Span::styled(format_amount(total), theme::amount_style())),
    ]);

    let widths = [
        Constraint::Length(6),
        Constraint::Length(12),
        Constraint::Min(20),
        Constraint::Length(18),
        Constraint::Length(14),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .footer(footer)
        .block(block(app));

    f.render_widget(table, area);
}
