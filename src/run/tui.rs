use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::config::Settings;
use crate::db::Database;
use crate::ui::app::{App, InputMode, PendingAction, Screen};
use crate::ui::commands;
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

pub(crate) fn as_tui(db: &mut Database, settings: &Settings) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let mut app = App::new(settings, today);
    app.refresh_all(db)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, db);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!(error = ?e, "dashboard exited with an error");
        eprintln!("spendboard: {e:#}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    db: &mut Database,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            // tab + status + command bars, table borders, header and footer
            let content_height = f.area().height.saturating_sub(7) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.show_help {
                app.show_help = false;
                continue;
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, db)?,
                InputMode::Command => handle_command_line(key, app, db)?,
                InputMode::Search => handle_search_line(key, app, db)?,
                InputMode::Editing => handle_editor_line(key, app, db)?,
                InputMode::Confirm => handle_confirmation(key, app, db)?,
                InputMode::Chat => handle_chat_line(key, app, db)?,
            }
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

/// Shared line editing for every text prompt. Returns true when `line` changed.
fn edit_line(key: &event::KeyEvent, line: &mut String) -> bool {
    match key.code {
        KeyCode::Backspace => line.pop().is_some(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            line.push(c);
            true
        }
        _ => false,
    }
}

fn handle_normal_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let half_page = (app.visible_rows / 2).max(1);
    match key.code {
        KeyCode::Char('q' | 'c') if ctrl => app.running = false,
        KeyCode::Char('d') if ctrl => move_cursor(app, Motion::Down(half_page)),
        KeyCode::Char('u') if ctrl => move_cursor(app, Motion::Up(half_page)),
        KeyCode::Char(':') => {
            app.command_input.clear();
            app.input_mode = InputMode::Command;
        }
        KeyCode::Char('/') => {
            app.search_input.clear();
            app.input_mode = InputMode::Search;
        }
        KeyCode::Char('j') | KeyCode::Down => move_cursor(app, Motion::Down(1)),
        KeyCode::Char('k') | KeyCode::Up => move_cursor(app, Motion::Up(1)),
        KeyCode::Char('g') | KeyCode::Home => move_cursor(app, Motion::Top),
        KeyCode::Char('G') | KeyCode::End => move_cursor(app, Motion::Bottom),
        KeyCode::Char(c @ '1'..='3') => {
            let index = c as usize - '1' as usize;
            switch_screen(app, db, Screen::all()[index])?;
        }
        KeyCode::Tab => cycle_screen(app, db, 1)?,
        KeyCode::BackTab => cycle_screen(app, db, -1)?,
        KeyCode::Char('H') => commands::handle_command("prev-month", app, db)?,
        KeyCode::Char('L') => commands::handle_command("next-month", app, db)?,
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('a') => commands::handle_command("add", app, db)?,
        KeyCode::Char('e') | KeyCode::Enter if app.screen == Screen::Expenses => {
            commands::handle_command("edit", app, db)?;
        }
        KeyCode::Char('D') if app.screen == Screen::Expenses => {
            commands::handle_command("delete", app, db)?;
        }
        KeyCode::Char('i') | KeyCode::Enter if app.screen == Screen::Assistant => {
            app.input_mode = InputMode::Chat;
        }
        KeyCode::Esc => clear_filters(app, db)?,
        _ => {}
    }
    Ok(())
}

fn handle_command_line(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let line = std::mem::take(&mut app.command_input);
            app.input_mode = InputMode::Normal;
            commands::handle_command(&line, app, db)?;
        }
        KeyCode::Esc => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        // Backspace on an empty prompt leaves command mode
        KeyCode::Backspace if app.command_input.is_empty() => {
            app.input_mode = InputMode::Normal;
        }
        _ => {
            edit_line(&key, &mut app.command_input);
        }
    }
    Ok(())
}

fn handle_search_line(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => app.input_mode = InputMode::Normal,
        KeyCode::Esc => {
            app.search_input.clear();
            app.input_mode = InputMode::Normal;
            app.refresh_expenses(db)?;
        }
        _ => {
            if edit_line(&key, &mut app.search_input) {
                // Filter as you type
                app.screen = Screen::Expenses;
                app.expense_index = 0;
                app.expense_scroll = 0;
                app.refresh_expenses(db)?;
            }
        }
    }
    Ok(())
}

fn handle_editor_line(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let line = std::mem::take(&mut app.command_input);
            let id = app.editing_id.take();
            app.input_mode = InputMode::Normal;
            commands::save_expense(&line, id, app, db)?;
        }
        KeyCode::Esc => {
            app.command_input.clear();
            app.editing_id = None;
            app.input_mode = InputMode::Normal;
            app.set_status("Nothing saved");
        }
        _ => {
            edit_line(&key, &mut app.command_input);
        }
    }
    Ok(())
}

fn handle_chat_line(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let question = std::mem::take(&mut app.chat_input);
            commands::submit_question(&question, app, db)?;
        }
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        _ => {
            edit_line(&key, &mut app.chat_input);
        }
    }
    Ok(())
}

/// Only an explicit `y` deletes; every other key backs out.
fn handle_confirmation(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    let pending = app.pending_action.take();
    app.input_mode = InputMode::Normal;
    app.confirm_message.clear();

    let confirmed = matches!(key.code, KeyCode::Char('y' | 'Y'));
    match pending {
        Some(PendingAction::DeleteExpense { id, description }) if confirmed => {
            let status = if db.delete(id)? {
                format!("Deleted #{id}: {description}")
            } else {
                format!("Expense #{id} was already gone")
            };
            app.refresh_all(db)?;
            app.set_status(status);
        }
        _ => app.set_status("Delete cancelled"),
    }
    Ok(())
}

// ── Navigation ───────────────────────────────────────────────

enum Motion {
    Up(usize),
    Down(usize),
    Top,
    Bottom,
}

fn move_cursor(app: &mut App, motion: Motion) {
    if app.screen != Screen::Expenses {
        return;
    }
    let len = app.expenses.len();
    let page = app.visible_rows.max(1);
    let (index, scroll) = (&mut app.expense_index, &mut app.expense_scroll);
    match motion {
        Motion::Up(steps) => {
            for _ in 0..steps {
                scroll_up(index, scroll);
            }
        }
        Motion::Down(steps) => {
            for _ in 0..steps {
                scroll_down(index, scroll, len, page);
            }
        }
        Motion::Top => scroll_to_top(index, scroll),
        Motion::Bottom => scroll_to_bottom(index, scroll, len, page),
    }
}

fn switch_screen(app: &mut App, db: &mut Database, screen: Screen) -> Result<()> {
    app.screen = screen;
    match screen {
        Screen::Dashboard => app.refresh_all(db),
        Screen::Expenses => app.refresh_expenses(db),
        Screen::Assistant => Ok(()),
    }
}

fn cycle_screen(app: &mut App, db: &mut Database, step: isize) -> Result<()> {
    let screens = Screen::all();
    let current = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
    let next = (current as isize + step).rem_euclid(screens.len() as isize) as usize;
    switch_screen(app, db, screens[next])
}

fn clear_filters(app: &mut App, db: &mut Database) -> Result<()> {
    app.status_message.clear();
    let filtered = !app.search_input.is_empty() || app.category_filter.is_some();
    if app.screen == Screen::Expenses && filtered {
        app.search_input.clear();
        app.category_filter = None;
        app.refresh_expenses(db)?;
        app.set_status("Filters cleared");
    }
    Ok(())
}
