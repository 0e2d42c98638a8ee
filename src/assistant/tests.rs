#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn expense(id: i64, description: &str, amount: Decimal, category: &str, on: &str) -> Expense {
    Expense {
        id,
        description: description.into(),
        amount,
        category: category.into(),
        date: date(on),
    }
}

fn sample() -> Vec<Expense> {
    vec![
        expense(1, "Groceries", dec!(24.50), "Food", "2025-07-10"),
        expense(2, "Bus ticket", dec!(2.75), "Transport", "2025-07-11"),
        expense(3, "Electricity bill", dec!(60.00), "Utilities", "2025-07-05"),
        expense(4, "Pizza", dec!(15.00), "Food", "2025-06-20"),
    ]
}

fn assistant() -> Assistant {
    Assistant::new(5)
}

fn ask(question: &str) -> Reply {
    assistant().respond(question, &sample(), date("2025-07-15"))
}

// ── Intent recognition ────────────────────────────────────────

#[test]
fn test_recognize_total_this_month() {
    let a = assistant();
    assert_eq!(a.recognize("How much did I spend this month?"), Intent::TotalThisMonth);
    assert_eq!(a.recognize("total"), Intent::TotalThisMonth);
}

#[test]
fn test_recognize_breakdown() {
    let a = assistant();
    assert_eq!(a.recognize("Give me a breakdown"), Intent::CategoryBreakdown);
    assert_eq!(a.recognize("spending by category"), Intent::CategoryBreakdown);
}

#[test]
fn test_recognize_top_category() {
    let a = assistant();
    assert_eq!(a.recognize("What's my top category?"), Intent::TopCategory);
    assert_eq!(a.recognize("Where do I spend the most?"), Intent::TopCategory);
}

#[test]
fn test_recognize_top_n_with_and_without_count() {
    let a = assistant();
    assert_eq!(a.recognize("show my top 3 expenses"), Intent::TopN { n: 3 });
    assert_eq!(a.recognize("biggest purchases"), Intent::TopN { n: 5 });
    assert_eq!(Assistant::new(2).recognize("largest expenses"), Intent::TopN { n: 2 });
}

#[test]
fn test_recognize_range() {
    assert_eq!(
        assistant().recognize("How much between 2025-07-01 and 2025-07-31?"),
        Intent::SpendingInRange {
            start: "2025-07-01".into(),
            end: "2025-07-31".into(),
        }
    );
    assert_eq!(
        assistant().recognize("spent from 2025-07-01 to 2025-07-05"),
        Intent::SpendingInRange {
            start: "2025-07-01".into(),
            end: "2025-07-05".into(),
        }
    );
}

#[test]
fn test_recognize_category_total() {
    let a = assistant();
    assert_eq!(
        a.recognize("How much did I spend on food?"),
        Intent::CategoryTotal {
            category: "food".into()
        }
    );
    assert_eq!(
        a.recognize("spent on Eating Out this month"),
        Intent::CategoryTotal {
            category: "Eating Out".into()
        }
    );
}

#[test]
fn test_recognize_add_expense() {
    let a = assistant();
    assert_eq!(
        a.recognize("add 12.50 lunch to Food on 2025-07-10"),
        Intent::AddExpense {
            amount: "12.50".into(),
            description: "lunch".into(),
            category: "Food".into(),
            date: Some("2025-07-10".into()),
        }
    );
    assert_eq!(
        a.recognize("Add an expense of $8 for movie tickets in Entertainment"),
        Intent::AddExpense {
            amount: "8".into(),
            description: "movie tickets".into(),
            category: "Entertainment".into(),
            date: None,
        }
    );
}

#[test]
fn test_recognize_budget_greeting_fallback() {
    let a = assistant();
    assert_eq!(a.recognize("suggest a budget"), Intent::BudgetSuggestion);
    assert_eq!(a.recognize("Hello there"), Intent::Greeting);
    assert_eq!(a.recognize("what's the weather"), Intent::Fallback);
    assert_eq!(a.recognize(""), Intent::Fallback);
}

#[test]
fn test_recognize_first_rule_wins() {
    // mentions "total" too, but the range rule sits earlier in the table
    assert!(matches!(
        assistant().recognize("total between 2025-07-01 and 2025-07-02"),
        Intent::SpendingInRange { .. }
    ));
    // "hi" alone greets, but a real question takes priority
    assert_eq!(assistant().recognize("hi, total this month?"), Intent::TotalThisMonth);
}

// ── Answers ───────────────────────────────────────────────────

#[test]
fn test_answer_total_this_month() {
    let reply = ask("how much this month");
    assert_eq!(
        reply.text,
        "You've spent $87.25 so far in July 2025 across 3 expenses."
    );
    assert!(reply.action.is_none());
}

#[test]
fn test_answer_breakdown_orders_by_total() {
    let reply = ask("breakdown");
    assert_eq!(
        reply.text,
        "Spending by category for July 2025: Utilities $60.00, Food $24.50, Transport $2.75."
    );
}

#[test]
fn test_answer_top_category_share() {
    let reply = ask("top category");
    assert_eq!(
        reply.text,
        "Your top category in July 2025 is Utilities at $60.00 (69% of spending)."
    );
}

#[test]
fn test_answer_top_category_with_zero_total() {
    // Rows written before sub-cent amounts were rejected can sum to zero
    let records = vec![expense(1, "Gum", dec!(0.00), "Food", "2025-07-10")];
    let reply = assistant().respond("top category", &records, date("2025-07-15"));
    assert_eq!(
        reply.text,
        "Your top category in July 2025 is Food at $0.00."
    );
}

#[test]
fn test_answer_top_n() {
    let reply = ask("top 1 expense");
    assert_eq!(
        reply.text,
        "Your largest expense: 1. Electricity bill $60.00 (Utilities, 2025-07-05)"
    );
    let reply = ask("top 2 expenses");
    assert!(reply.text.starts_with("Your 2 largest expenses:"));
    assert!(reply.text.contains("2. Groceries $24.50"));
}

#[test]
fn test_answer_top_n_zero() {
    let reply = ask("top 0 expenses");
    assert!(reply.text.contains("at least one"));
}

#[test]
fn test_answer_range() {
    let reply = ask("between 2025-07-01 and 2025-07-31");
    assert_eq!(
        reply.text,
        "You spent $87.25 between 2025-07-01 and 2025-07-31."
    );
}

#[test]
fn test_answer_range_invalid() {
    assert!(ask("between 2025-07-31 and 2025-07-01")
        .text
        .contains("must not be after"));
    assert!(ask("between 2025-7-1 and 2025-07-31")
        .text
        .contains("couldn't read that range"));
}

#[test]
fn test_answer_category_total_case_insensitive() {
    let reply = ask("how much did I spend on FOOD?");
    assert_eq!(
        reply.text,
        "You've spent $39.50 on Food in total, $24.50 of it in July 2025."
    );
}

#[test]
fn test_answer_category_total_unknown() {
    let reply = ask("spent on yachts");
    assert!(reply.text.contains("\"yachts\""));
}

#[test]
fn test_answer_budget_suggestion() {
    // May 0 + June 15.00 + July 87.25 = 102.25 / 3 = 34.08, 90% = 30.67
    let reply = ask("suggest a budget");
    assert!(reply.text.contains("$34.08"), "{}", reply.text);
    assert!(reply.text.contains("$30.67"), "{}", reply.text);
}

#[test]
fn test_answer_budget_without_history() {
    let reply = assistant().respond("budget", &[], date("2025-07-15"));
    assert!(reply.text.contains("spending history"));
}

#[test]
fn test_answer_add_expense_returns_action() {
    let reply = ask("add 12.50 lunch to food on 2025-07-14");
    let action = reply.action.unwrap();
    assert_eq!(action.amount(), dec!(12.50));
    assert_eq!(action.description(), "lunch");
    // matched against the stored spelling
    assert_eq!(action.category(), "Food");
    assert_eq!(action.date(), date("2025-07-14"));
    assert_eq!(
        reply.text,
        "Added \"lunch\" for $12.50 under Food on 2025-07-14."
    );
}

#[test]
fn test_answer_add_expense_defaults_to_today() {
    let reply = ask("add 3 coffee to Drinks");
    let action = reply.action.unwrap();
    assert_eq!(action.date(), date("2025-07-15"));
    assert_eq!(action.category(), "Drinks");
}

#[test]
fn test_answer_add_expense_validation_error() {
    let reply = ask("add -4 refund to Food");
    assert!(reply.action.is_none());
    assert!(reply.text.starts_with("I couldn't add that expense"));

    let reply = ask("add 4 snack to Food on 15/07/2025");
    assert!(reply.action.is_none());
    assert!(reply.text.contains("invalid date"));
}

#[test]
fn test_answer_empty_store() {
    let reply = assistant().respond("top 3 expenses", &[], date("2025-07-15"));
    assert_eq!(reply.text, "You haven't recorded any expenses yet.");
    let reply = assistant().respond("breakdown", &[], date("2025-07-15"));
    assert_eq!(reply.text, "No expenses recorded in July 2025 yet.");
}

#[test]
fn test_answer_fallback_lists_examples() {
    let reply = ask("tell me a joke");
    assert!(reply.text.starts_with("Sorry"));
    assert!(reply.text.contains(help_text()));
}
