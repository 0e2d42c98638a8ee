//! Rule-based spending assistant.
//!
//! A question is matched against an ordered table of case-insensitive
//! patterns; the first hit decides the [`Intent`]. Answering an intent only
//! reads the snapshot it is given, through the aggregation functions in
//! [`crate::analytics`]. Adding an expense is returned to the caller as a
//! validated [`NewExpense`] to persist; the assistant never writes.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};
use rust_decimal::Decimal;

use crate::analytics::{
    bucket_by_month, first_of_month, group_by_category, top_n, total_in_range,
};
use crate::models::{parse_date, Expense, NewExpense, DATE_FORMAT};
use crate::ui::util::format_amount;

/// Months of history the budget suggestion averages over.
const BUDGET_LOOKBACK_MONTHS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Intent {
    AddExpense {
        amount: String,
        description: String,
        category: String,
        date: Option<String>,
    },
    SpendingInRange {
        start: String,
        end: String,
    },
    TopN {
        n: usize,
    },
    TopCategory,
    CategoryBreakdown,
    BudgetSuggestion,
    CategoryTotal {
        category: String,
    },
    TotalThisMonth,
    Greeting,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reply {
    pub text: String,
    /// Set when the question asked for a new expense to be recorded.
    pub action: Option<NewExpense>,
}

impl Reply {
    fn say(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: None,
        }
    }
}

struct Rule {
    regex: Regex,
    build: fn(&Captures<'_>, usize) -> Intent,
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    let table: [(&str, fn(&Captures<'_>, usize) -> Intent); 9] = [
        (
            r"(?i)^\s*add\s+(?:an?\s+)?(?:expense\s+)?(?:of\s+)?\$?(?P<amount>-?[\d.,]+)\s+(?:for\s+)?(?P<description>.+?)\s+(?:to|in|under)\s+(?P<category>.+?)(?:\s+on\s+(?P<date>\S+))?\s*[.!]*$",
            build_add,
        ),
        (
            r"(?i)\b(?:between|from)\s+(?P<start>\d{4}-\d{1,2}-\d{1,2})\s+(?:and|to|until)\s+(?P<end>\d{4}-\d{1,2}-\d{1,2})",
            build_range,
        ),
        (
            r"(?i)\b(?:top|biggest|largest)\s+(?:(?P<n>\d+)\s+)?(?:expenses?|purchases?|transactions?)\b",
            build_top_n,
        ),
        (
            r"(?i)\b(?:top|biggest|largest|main)\s+categor(?:y|ies)\b|\bspend\s+(?:the\s+)?most\b",
            |_, _| Intent::TopCategory,
        ),
        (
            r"(?i)\bbreak\s*down\b|\b(?:by|per)\s+category\b|\bcategories\b",
            |_, _| Intent::CategoryBreakdown,
        ),
        (r"(?i)\bbudget\b", |_, _| Intent::BudgetSuggestion),
        (
            r"(?i)\b(?:spen[dt]|spending|how\s+much)\b.*?\bon\s+(?P<category>[^?.!]+?)(?:\s+this\s+month)?\s*[?.!]*$",
            build_category_total,
        ),
        (
            r"(?i)\bthis\s+month\b|\btotal\b|\bhow\s+much\b",
            |_, _| Intent::TotalThisMonth,
        ),
        (
            r"(?i)^\s*(?:hi|hello|hey|good\s+(?:morning|afternoon|evening))\b",
            |_, _| Intent::Greeting,
        ),
    ];

    table
        .into_iter()
        .filter_map(|(pattern, build)| match Regex::new(pattern) {
            Ok(regex) => Some(Rule { regex, build }),
            Err(e) => {
                tracing::warn!(pattern, error = %e, "skipping assistant rule");
                None
            }
        })
        .collect()
});

fn capture(caps: &Captures<'_>, name: &str) -> String {
    caps.name(name)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

fn build_add(caps: &Captures<'_>, _: usize) -> Intent {
    Intent::AddExpense {
        amount: capture(caps, "amount"),
        description: capture(caps, "description"),
        category: capture(caps, "category"),
        date: caps.name("date").map(|m| m.as_str().to_string()),
    }
}

fn build_range(caps: &Captures<'_>, _: usize) -> Intent {
    Intent::SpendingInRange {
        start: capture(caps, "start"),
        end: capture(caps, "end"),
    }
}

fn build_top_n(caps: &Captures<'_>, default_n: usize) -> Intent {
    let n = caps
        .name("n")
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(default_n);
    Intent::TopN { n }
}

fn build_category_total(caps: &Captures<'_>, _: usize) -> Intent {
    Intent::CategoryTotal {
        category: capture(caps, "category"),
    }
}

pub(crate) struct Assistant {
    default_top_n: usize,
}

impl Assistant {
    pub(crate) fn new(default_top_n: usize) -> Self {
        Self { default_top_n }
    }

    pub(crate) fn recognize(&self, question: &str) -> Intent {
        RULES
            .iter()
            .find_map(|rule| {
                rule.regex
                    .captures(question)
                    .map(|caps| (rule.build)(&caps, self.default_top_n))
            })
            .unwrap_or(Intent::Fallback)
    }

    pub(crate) fn respond(&self, question: &str, records: &[Expense], today: NaiveDate) -> Reply {
        let intent = self.recognize(question);
        tracing::debug!(?intent, "assistant intent");
        answer(intent, records, today)
    }
}

pub(crate) fn answer(intent: Intent, records: &[Expense], today: NaiveDate) -> Reply {
    match intent {
        Intent::AddExpense {
            amount,
            description,
            category,
            date,
        } => add_expense(records, today, &amount, &description, &category, date),
        Intent::SpendingInRange { start, end } => spending_in_range(records, &start, &end),
        Intent::TopN { n } => largest_expenses(records, n),
        Intent::TopCategory => top_category(records, today),
        Intent::CategoryBreakdown => category_breakdown(records, today),
        Intent::BudgetSuggestion => budget_suggestion(records, today),
        Intent::CategoryTotal { category } => category_total(records, today, &category),
        Intent::TotalThisMonth => total_this_month(records, today),
        Intent::Greeting => Reply::say(
            "Hi! Ask me about your spending, e.g. \"how much did I spend this month?\"",
        ),
        Intent::Fallback => Reply::say(format!("Sorry, I didn't catch that. {}", help_text())),
    }
}

pub(crate) fn help_text() -> &'static str {
    "Try: \"total this month\", \"breakdown by category\", \"top category\", \
     \"top 5 expenses\", \"spent on food\", \"between 2025-07-01 and 2025-07-31\", \
     \"suggest a budget\" or \"add 12.50 lunch to Food\"."
}

// ── Intent handlers ──────────────────────────────────────────

fn month_to_date(records: &[Expense], today: NaiveDate) -> Vec<Expense> {
    let start = first_of_month(today);
    records
        .iter()
        .filter(|r| r.date >= start && r.date <= today)
        .cloned()
        .collect()
}

fn month_label(today: NaiveDate) -> String {
    today.format("%B %Y").to_string()
}

/// Stored spelling of `wanted`, compared case-insensitively.
fn canonical_category<'a>(records: &'a [Expense], wanted: &str) -> Option<&'a str> {
    let wanted = wanted.trim().to_lowercase();
    records
        .iter()
        .map(|r| r.category.as_str())
        .find(|c| c.to_lowercase() == wanted)
}

fn add_expense(
    records: &[Expense],
    today: NaiveDate,
    amount: &str,
    description: &str,
    category: &str,
    date: Option<String>,
) -> Reply {
    let category = canonical_category(records, category).unwrap_or(category);
    let date = date.unwrap_or_else(|| today.format(DATE_FORMAT).to_string());

    match NewExpense::new(description, amount, category, &date) {
        Ok(expense) => Reply {
            text: format!(
                "Added \"{}\" for {} under {} on {}.",
                expense.description(),
                format_amount(expense.amount()),
                expense.category(),
                expense.date().format(DATE_FORMAT)
            ),
            action: Some(expense),
        },
        Err(e) => Reply::say(format!("I couldn't add that expense: {e}.")),
    }
}

fn spending_in_range(records: &[Expense], start: &str, end: &str) -> Reply {
    let (start, end) = match (parse_date(start), parse_date(end)) {
        (Ok(s), Ok(e)) => (s, e),
        (Err(e), _) | (_, Err(e)) => return Reply::say(format!("I couldn't read that range: {e}.")),
    };
    if start > end {
        return Reply::say("The start date must not be after the end date.");
    }

    let total = total_in_range(records, start, end);
    Reply::say(format!(
        "You spent {} between {} and {}.",
        format_amount(total),
        start.format(DATE_FORMAT),
        end.format(DATE_FORMAT)
    ))
}

fn largest_expenses(records: &[Expense], n: usize) -> Reply {
    let top = top_n(records, n);
    if top.is_empty() {
        return if records.is_empty() {
            Reply::say("You haven't recorded any expenses yet.")
        } else {
            Reply::say("Ask for at least one expense, e.g. \"top 3 expenses\".")
        };
    }

    let lines: Vec<String> = top
        .iter()
        .enumerate()
        .map(|(i, e)| {
            format!(
                "{}. {} {} ({}, {})",
                i + 1,
                e.description,
                format_amount(e.amount),
                e.category,
                e.date_str()
            )
        })
        .collect();
    let heading = if top.len() == 1 {
        "Your largest expense:".to_string()
    } else {
        format!("Your {} largest expenses:", top.len())
    };
    Reply::say(format!("{heading} {}", lines.join("; ")))
}

fn top_category(records: &[Expense], today: NaiveDate) -> Reply {
    let month = month_to_date(records, today);
    let groups = group_by_category(&month);
    let Some((name, amount)) = groups.first() else {
        return Reply::say(format!("No expenses recorded in {} yet.", month_label(today)));
    };

    let total: Decimal = groups.iter().map(|(_, v)| *v).sum();
    let share = match amount.checked_div(total) {
        Some(ratio) => format!(" ({}% of spending)", (ratio * Decimal::ONE_HUNDRED).round_dp(0)),
        None => String::new(),
    };
    Reply::say(format!(
        "Your top category in {} is {name} at {}{share}.",
        month_label(today),
        format_amount(*amount)
    ))
}

fn category_breakdown(records: &[Expense], today: NaiveDate) -> Reply {
    let groups = group_by_category(&month_to_date(records, today));
    if groups.is_empty() {
        return Reply::say(format!("No expenses recorded in {} yet.", month_label(today)));
    }
    let parts: Vec<String> = groups
        .iter()
        .map(|(name, amount)| format!("{name} {}", format_amount(*amount)))
        .collect();
    Reply::say(format!(
        "Spending by category for {}: {}.",
        month_label(today),
        parts.join(", ")
    ))
}

fn budget_suggestion(records: &[Expense], today: NaiveDate) -> Reply {
    let history = bucket_by_month(records, BUDGET_LOOKBACK_MONTHS, today);
    let total = history.total();
    if total.is_zero() {
        return Reply::say(
            "I need some spending history first. Record a few expenses and ask again.",
        );
    }

    let average = (total / Decimal::from(BUDGET_LOOKBACK_MONTHS)).round_dp(2);
    let suggested = (average * Decimal::new(9, 1)).round_dp(2);
    Reply::say(format!(
        "You've averaged {} a month over the last {BUDGET_LOOKBACK_MONTHS} months. \
         A monthly budget of {} would trim that by 10%.",
        format_amount(average),
        format_amount(suggested)
    ))
}

fn category_total(records: &[Expense], today: NaiveDate, wanted: &str) -> Reply {
    let Some(name) = canonical_category(records, wanted) else {
        return Reply::say(format!(
            "I couldn't find any expenses in a category called \"{}\".",
            wanted.trim()
        ));
    };

    let key = name.to_lowercase();
    let matching: Vec<Expense> = records
        .iter()
        .filter(|r| r.category.to_lowercase() == key)
        .cloned()
        .collect();
    let all_time: Decimal = matching.iter().map(|r| r.amount).sum();
    let this_month = total_in_range(&matching, first_of_month(today), today);
    Reply::say(format!(
        "You've spent {} on {name} in total, {} of it in {}.",
        format_amount(all_time),
        format_amount(this_month),
        month_label(today)
    ))
}

fn total_this_month(records: &[Expense], today: NaiveDate) -> Reply {
    let month = month_to_date(records, today);
    let total = total_in_range(&month, first_of_month(today), today);
    let count = month.len();
    Reply::say(format!(
        "You've spent {} so far in {} across {count} expense{}.",
        format_amount(total),
        month_label(today),
        if count == 1 { "" } else { "s" }
    ))
}

#[cfg(test)]
mod tests;
