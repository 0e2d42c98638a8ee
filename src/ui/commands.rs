use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use chrono::NaiveDate;

use super::app::{App, InputMode, PendingAction, Screen, Speaker};
use super::util::{quote_arg, split_args};
use crate::db::Database;
use crate::error::StoreError;
use crate::models::{Expense, NewExpense, DATE_FORMAT};

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Database) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

const ADD_USAGE: &str = "Usage: :add <YYYY-MM-DD> <amount> <category> <description>";

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit Spendboard", cmd_quit, r);
    register_command!("quit", "Quit Spendboard", cmd_quit, r);
    register_command!("d", "Go to Dashboard", cmd_dashboard, r);
    register_command!("dashboard", "Go to Dashboard", cmd_dashboard, r);
    register_command!("e", "Go to Expenses", cmd_expenses, r);
    register_command!("expenses", "Go to Expenses", cmd_expenses, r);
    register_command!("a", "Go to Assistant", cmd_assistant, r);
    register_command!("assistant", "Go to Assistant", cmd_assistant, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!(
        "add",
        "Add expense (e.g. :add 2025-07-10 24.50 Food Groceries)",
        cmd_add,
        r
    );
    register_command!("edit", "Edit selected expense", cmd_edit, r);
    register_command!("delete", "Delete selected expense", cmd_delete, r);
    register_command!(
        "export",
        "Export listed expenses to CSV (e.g. :export ~/july.csv)",
        cmd_export,
        r
    );
    register_command!("month", "Set month (e.g. :month 2025-07)", cmd_month, r);
    register_command!("m", "Set month (e.g. :m 07)", cmd_month, r);
    register_command!("next-month", "Go to next month", cmd_next_month, r);
    register_command!("prev-month", "Go to previous month", cmd_prev_month, r);
    register_command!(
        "search",
        "Search expenses (e.g. :search coffee)",
        cmd_search,
        r
    );
    register_command!("s", "Search expenses (e.g. :s coffee)", cmd_search, r);
    register_command!(
        "category",
        "Filter by category (e.g. :category Food)",
        cmd_category,
        r
    );
    register_command!("cat", "Filter by category", cmd_category, r);
    register_command!(
        "ask",
        "Ask the assistant (e.g. :ask top category)",
        cmd_ask,
        r
    );
    register_command!("seed", "Load sample expenses into an empty store", cmd_seed, r);

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if cmd_name.is_empty() {
        return Ok(());
    }

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, db)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| (levenshtein(input, k), **k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Prefilled editor text for `expense`, in `:add` argument order.
pub(crate) fn expense_to_args(expense: &Expense) -> String {
    format!(
        "{} {:.2} {} {}",
        expense.date_str(),
        expense.amount,
        quote_arg(&expense.category),
        expense.description
    )
}

/// Insert or replace from editor text. Validation and not-found problems go
/// to the status bar; anything else is a real failure.
pub(crate) fn save_expense(
    input: &str,
    id: Option<i64>,
    app: &mut App,
    db: &mut Database,
) -> anyhow::Result<()> {
    let args = split_args(input);
    if args.len() < 4 {
        app.set_status(ADD_USAGE);
        return Ok(());
    }
    let expense = match NewExpense::from_args(&args) {
        Ok(e) => e,
        Err(e) => {
            app.set_status(format!("Invalid expense: {e}"));
            return Ok(());
        }
    };

    let result = match id {
        Some(id) => db.update(id, &expense),
        None => db.insert(&expense),
    };
    let saved = match result {
        Ok(saved) => saved,
        Err(e) => return report_store_error(e, app),
    };

    app.refresh_all(db)?;
    let verb = if id.is_some() { "Updated" } else { "Added" };
    app.set_status(format!(
        "{verb} #{}: {} {} ({})",
        saved.id,
        saved.description,
        super::util::format_amount(saved.amount),
        saved.category
    ));
    Ok(())
}

/// Pass a question to the assistant, persist any expense it produced,
/// and append both sides to the transcript.
pub(crate) fn submit_question(question: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let question = question.trim();
    if question.is_empty() {
        return Ok(());
    }
    app.push_chat(Speaker::User, question);

    let reply = app.assistant.respond(question, &app.records, app.today);
    let text = match reply.action {
        Some(expense) => match db.insert(&expense) {
            Ok(saved) => {
                app.refresh_all(db)?;
                format!("{} (#{})", reply.text, saved.id)
            }
            Err(StoreError::Validation(e)) => format!("I couldn't add that expense: {e}."),
            Err(e) => return Err(e.into()),
        },
        None => reply.text,
    };
    app.push_chat(Speaker::Assistant, text);
    Ok(())
}

fn report_store_error(err: StoreError, app: &mut App) -> anyhow::Result<()> {
    match err {
        StoreError::Validation(e) => {
            app.set_status(format!("Invalid expense: {e}"));
            Ok(())
        }
        StoreError::NotFound(id) => {
            app.set_status(format!("Expense #{id} no longer exists"));
            Ok(())
        }
        other => Err(other.into()),
    }
}

fn require_selection(app: &mut App) -> Option<Expense> {
    if app.screen != Screen::Expenses || app.expenses.is_empty() {
        app.set_status("Navigate to Expenses and select one first");
        return None;
    }
    app.selected_expense().cloned()
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_dashboard(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Dashboard;
    app.refresh_all(db)
}

fn cmd_expenses(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Expenses;
    app.refresh_expenses(db)
}

fn cmd_assistant(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Assistant;
    app.input_mode = InputMode::Chat;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_add(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        // Open the editor with today's date filled in
        app.editing_id = None;
        app.command_input = format!("{} ", app.today.format(DATE_FORMAT));
        app.input_mode = InputMode::Editing;
        app.set_status("New expense: <date> <amount> <category> <description>, Enter to save");
        return Ok(());
    }
    save_expense(args, None, app, db)
}

fn cmd_edit(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let Some(expense) = require_selection(app) else {
        return Ok(());
    };

    if args.is_empty() {
        app.editing_id = Some(expense.id);
        app.command_input = expense_to_args(&expense);
        app.input_mode = InputMode::Editing;
        app.set_status(format!("Editing #{}, Enter to save, Esc to cancel", expense.id));
        return Ok(());
    }
    save_expense(args, Some(expense.id), app, db)
}

fn cmd_delete(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    if let Some(expense) = require_selection(app) {
        app.confirm_message = format!("Delete '{}'?", expense.description);
        app.pending_action = Some(PendingAction::DeleteExpense {
            id: expense.id,
            description: expense.description,
        });
        app.input_mode = InputMode::Confirm;
    }
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let path = if args.is_empty() {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        PathBuf::from(format!("{home}/spendboard-export-{}.csv", app.month_key()))
    } else {
        PathBuf::from(crate::run::shellexpand(args))
    };

    app.refresh_expenses(db)?;
    match crate::export::export_to_path(&path, &app.expenses) {
        Ok(0) => app.set_status(format!("No expenses to export ({})", path.display())),
        Ok(count) => app.set_status(format!("Exported {count} expenses to {}", path.display())),
        Err(e) => {
            tracing::warn!(error = %e, "export failed");
            app.set_status(format!("Export failed: {e:#}"));
        }
    }
    Ok(())
}

fn cmd_month(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_month(app.today, db)?;
        app.set_status(format!("Month: {}", app.month_key()));
        return Ok(());
    }

    // Accept "2025-07", "2025-7", "07" or "7"
    let month = if args.len() <= 2 {
        format!("{}-{args:0>2}", app.month.format("%Y"))
    } else {
        args.to_string()
    };

    match NaiveDate::parse_from_str(&format!("{month}-01"), DATE_FORMAT) {
        Ok(first) => {
            app.set_month(first, db)?;
            app.set_status(format!("Month: {}", app.month_key()));
        }
        Err(_) => app.set_status("Invalid month format. Use YYYY-MM (e.g. 2025-07)"),
    }
    Ok(())
}

fn cmd_next_month(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.shift_month(1, db)?;
    app.set_status(format!("Month: {}", app.month_key()));
    Ok(())
}

fn cmd_prev_month(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.shift_month(-1, db)?;
    app.set_status(format!("Month: {}", app.month_key()));
    Ok(())
}

fn cmd_search(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.search_input = args.to_string();
    app.screen = Screen::Expenses;
    app.expense_index = 0;
    app.expense_scroll = 0;
    app.refresh_expenses(db)?;

    if args.is_empty() {
        app.set_status("Search cleared");
    } else {
        app.set_status(format!("Searching: {args} ({} matches)", app.expenses.len()));
    }
    Ok(())
}

fn cmd_category(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Expenses;
    app.expense_index = 0;
    app.expense_scroll = 0;

    if args.is_empty() {
        app.category_filter = None;
        app.refresh_expenses(db)?;
        app.set_status("Category filter cleared");
        return Ok(());
    }

    let wanted = args.trim_matches('"');
    match app
        .categories
        .iter()
        .find(|c| c.eq_ignore_ascii_case(wanted))
        .cloned()
    {
        Some(name) => {
            app.category_filter = Some(name.clone());
            app.refresh_expenses(db)?;
            app.set_status(format!("Filtering by category: {name}"));
        }
        None => {
            app.set_status(format!(
                "Category not found. Available: {}",
                app.categories.join(", ")
            ));
        }
    }
    Ok(())
}

fn cmd_ask(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Assistant;
    if args.is_empty() {
        app.input_mode = InputMode::Chat;
        return Ok(());
    }
    submit_question(args, app, db)
}

fn cmd_seed(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let count = db.seed_sample(app.today)?;
    if count == 0 {
        app.set_status("Store already has expenses; nothing seeded");
    } else {
        app.refresh_all(db)?;
        app.set_status(format!("Seeded {count} sample expenses"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
