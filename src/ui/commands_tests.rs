#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::*;
use crate::config::Settings;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 15).unwrap()
}

fn setup() -> (App, Database) {
    let db = Database::open_in_memory().unwrap();
    let mut app = App::new(&Settings::default(), today());
    app.refresh_all(&db).unwrap();
    (app, db)
}

fn run(input: &str, app: &mut App, db: &mut Database) {
    handle_command(input, app, db).unwrap();
}

// ── Registry ──────────────────────────────────────────────────

#[test]
fn test_unknown_command_suggests_closest() {
    let (mut app, mut db) = setup();
    run("expnses", &mut app, &mut db);
    assert_eq!(
        app.status_message,
        "Unknown command: :expnses. Did you mean :expenses?"
    );
}

#[test]
fn test_every_alias_has_a_description() {
    assert!(COMMANDS.values().all(|c| !c.description.is_empty()));
    for name in [
        "quit", "dashboard", "expenses", "assistant", "add", "edit", "delete", "export",
        "month", "next-month", "prev-month", "search", "category", "ask", "seed", "help",
    ] {
        assert!(COMMANDS.contains_key(name), "missing :{name}");
    }
}

#[test]
fn test_quit_and_screens() {
    let (mut app, mut db) = setup();
    run("e", &mut app, &mut db);
    assert_eq!(app.screen, Screen::Expenses);
    run("assistant", &mut app, &mut db);
    assert_eq!(app.screen, Screen::Assistant);
    assert_eq!(app.input_mode, InputMode::Chat);
    run("q", &mut app, &mut db);
    assert!(!app.running);
}

// ── add / edit / delete ───────────────────────────────────────

#[test]
fn test_add_inserts_and_recomputes() {
    let (mut app, mut db) = setup();
    run("add 2025-07-10 24.50 Food Weekly groceries", &mut app, &mut db);

    assert_eq!(app.expense_count, 1);
    assert_eq!(app.records[0].description, "Weekly groceries");
    assert_eq!(app.dashboard.kpis.month_total, dec!(24.50));
    assert!(app.status_message.starts_with("Added #1"));
}

#[test]
fn test_add_quoted_category() {
    let (mut app, mut db) = setup();
    run("add 2025-07-11 18.40 \"Eating Out\" Team lunch", &mut app, &mut db);
    assert_eq!(app.categories, vec!["Eating Out"]);
}

#[test]
fn test_add_invalid_reports_in_status() {
    let (mut app, mut db) = setup();
    run("add 2025-07-10 -3 Food Refund", &mut app, &mut db);
    assert_eq!(app.expense_count, 0);
    assert!(app.status_message.starts_with("Invalid expense"));

    run("add 2025-07-10 3", &mut app, &mut db);
    assert_eq!(app.status_message, ADD_USAGE);
}

#[test]
fn test_add_without_args_opens_editor() {
    let (mut app, mut db) = setup();
    run("add", &mut app, &mut db);
    assert_eq!(app.input_mode, InputMode::Editing);
    assert_eq!(app.command_input, "2025-07-15 ");
    assert_eq!(app.editing_id, None);
}

#[test]
fn test_edit_prefills_selected_expense() {
    let (mut app, mut db) = setup();
    run("add 2025-07-10 24.5 \"Eating Out\" Pizza night", &mut app, &mut db);
    run("expenses", &mut app, &mut db);
    run("edit", &mut app, &mut db);

    assert_eq!(app.input_mode, InputMode::Editing);
    assert_eq!(app.editing_id, Some(1));
    assert_eq!(app.command_input, "2025-07-10 24.50 \"Eating Out\" Pizza night");
}

#[test]
fn test_edit_requires_expenses_screen() {
    let (mut app, mut db) = setup();
    run("add 2025-07-10 5 Food Snack", &mut app, &mut db);
    run("edit", &mut app, &mut db);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(app.status_message.contains("select one first"));
}

#[test]
fn test_save_expense_updates_in_place() {
    let (mut app, mut db) = setup();
    run("add 2025-07-10 5 Food Snack", &mut app, &mut db);
    save_expense("2025-07-11 6.25 Food Bigger snack", Some(1), &mut app, &mut db).unwrap();

    let stored = db.get(1).unwrap().unwrap();
    assert_eq!(stored.amount, dec!(6.25));
    assert_eq!(stored.description, "Bigger snack");
    assert_eq!(app.expense_count, 1);
    assert!(app.status_message.starts_with("Updated #1"));
}

#[test]
fn test_save_expense_missing_id_is_status_not_error() {
    let (mut app, mut db) = setup();
    save_expense("2025-07-11 6.25 Food Snack", Some(99), &mut app, &mut db).unwrap();
    assert_eq!(app.status_message, "Expense #99 no longer exists");
}

#[test]
fn test_delete_asks_for_confirmation() {
    let (mut app, mut db) = setup();
    run("add 2025-07-10 5 Food Snack", &mut app, &mut db);
    run("expenses", &mut app, &mut db);
    run("delete", &mut app, &mut db);

    assert_eq!(app.input_mode, InputMode::Confirm);
    assert_eq!(app.confirm_message, "Delete 'Snack'?");
    assert_eq!(
        app.pending_action,
        Some(PendingAction::DeleteExpense {
            id: 1,
            description: "Snack".into()
        })
    );
    // nothing removed until confirmed
    assert_eq!(db.count().unwrap(), 1);
}

// ── Month, search, category ───────────────────────────────────

#[test]
fn test_month_navigation() {
    let (mut app, mut db) = setup();
    run("add 2025-06-20 15 Food Pizza", &mut app, &mut db);
    run("add 2025-07-10 24.50 Food Groceries", &mut app, &mut db);

    run("prev-month", &mut app, &mut db);
    assert_eq!(app.month_key(), "2025-06");
    assert_eq!(app.reference_date(), NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());
    assert_eq!(app.dashboard.kpis.month_total, dec!(15));
    assert_eq!(app.expenses.len(), 1);

    run("next-month", &mut app, &mut db);
    assert_eq!(app.month_key(), "2025-07");
    assert_eq!(app.reference_date(), today());

    run("month 2024-12", &mut app, &mut db);
    assert_eq!(app.month_key(), "2024-12");
    run("next-month", &mut app, &mut db);
    assert_eq!(app.month_key(), "2025-01");

    run("m 6", &mut app, &mut db);
    assert_eq!(app.month_key(), "2025-06");
    run("month", &mut app, &mut db);
    assert_eq!(app.month_key(), "2025-07");

    run("month 2025-13", &mut app, &mut db);
    assert!(app.status_message.starts_with("Invalid month"));
    assert_eq!(app.month_key(), "2025-07");
}

#[test]
fn test_search_and_category_filters() {
    let (mut app, mut db) = setup();
    run("add 2025-07-10 24.50 Food Groceries", &mut app, &mut db);
    run("add 2025-07-11 2.75 Transport Bus ticket", &mut app, &mut db);
    run("add 2025-07-12 4.10 Food Coffee", &mut app, &mut db);

    run("search bus", &mut app, &mut db);
    assert_eq!(app.screen, Screen::Expenses);
    assert_eq!(app.expenses.len(), 1);
    run("search", &mut app, &mut db);
    assert_eq!(app.expenses.len(), 3);

    run("category food", &mut app, &mut db);
    assert_eq!(app.category_filter.as_deref(), Some("Food"));
    assert_eq!(app.expenses.len(), 2);

    run("cat Travel", &mut app, &mut db);
    assert!(app.status_message.starts_with("Category not found"));
    assert_eq!(app.expenses.len(), 2);

    run("category", &mut app, &mut db);
    assert_eq!(app.category_filter, None);
    assert_eq!(app.expenses.len(), 3);
}

// ── Assistant, export, seed ───────────────────────────────────

#[test]
fn test_ask_appends_transcript() {
    let (mut app, mut db) = setup();
    run("add 2025-07-10 24.50 Food Groceries", &mut app, &mut db);
    let before = app.chat.len();

    run("ask total this month", &mut app, &mut db);
    assert_eq!(app.screen, Screen::Assistant);
    assert_eq!(app.chat.len(), before + 2);
    assert_eq!(app.chat[before].speaker, Speaker::User);
    assert_eq!(
        app.chat[before + 1].text,
        "You've spent $24.50 so far in July 2025 across 1 expense."
    );
}

#[test]
fn test_ask_add_persists_expense() {
    let (mut app, mut db) = setup();
    run("ask add 12.50 lunch to Food", &mut app, &mut db);

    assert_eq!(db.count().unwrap(), 1);
    assert_eq!(app.expense_count, 1);
    let last = app.chat.last().unwrap();
    assert_eq!(last.speaker, Speaker::Assistant);
    assert!(last.text.ends_with("(#1)"), "{}", last.text);
    assert_eq!(app.dashboard.kpis.month_total, dec!(12.50));
}

#[test]
fn test_export_writes_listed_expenses() {
    let (mut app, mut db) = setup();
    run("add 2025-07-10 24.50 Food Groceries", &mut app, &mut db);
    run("add 2025-06-10 9.00 Food Older", &mut app, &mut db);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("july.csv");
    run(&format!("export {}", path.display()), &mut app, &mut db);

    assert!(app.status_message.starts_with("Exported 1 expenses"));
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("Groceries"));
    assert!(!content.contains("Older"));
}

#[test]
fn test_seed_only_when_empty() {
    let (mut app, mut db) = setup();
    run("seed", &mut app, &mut db);
    assert!(app.expense_count > 0);
    assert!(app.status_message.starts_with("Seeded"));

    let count = app.expense_count;
    run("seed", &mut app, &mut db);
    assert_eq!(app.expense_count, count);
    assert!(app.status_message.contains("nothing seeded"));
}
