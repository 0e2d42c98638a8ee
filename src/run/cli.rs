use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::PathBuf;

use crate::analytics::{self, Kpis};
use crate::assistant::Assistant;
use crate::config::Settings;
use crate::db::Database;
use crate::models::{parse_date, Expense, ExpenseFilter, NewExpense};

pub(crate) fn as_cli(args: &[String], db: &mut Database, settings: &Settings) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    match args[1].as_str() {
        "add" => cli_add(&args[2..], db),
        "list" | "ls" => cli_list(&args[2..], db),
        "update" => cli_update(&args[2..], db),
        "delete" | "rm" => cli_delete(&args[2..], db),
        "export" => cli_export(&args[2..], db, today),
        "summary" | "s" => cli_summary(&args[2..], db, settings, today),
        "top" => cli_top(&args[2..], db, settings),
        "ask" => cli_ask(&args[2..], db, settings, today),
        "seed" => cli_seed(db, today),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("spendboard {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("Spendboard: local expense tracker with a terminal dashboard");
    println!();
    println!("Usage: spendboard [command]");
    println!();
    println!("Commands:");
    println!("  (none)                                  Launch interactive dashboard");
    println!("  add <date> <amount> <category> <desc>   Record an expense");
    println!("  list                                    List expenses (newest first)");
    println!("    --month <YYYY-MM>  --category <name>  --search <text>");
    println!("    --from <YYYY-MM-DD>  --to <YYYY-MM-DD>  --limit <n>");
    println!("  update <id> <date> <amount> <category> <desc>");
    println!("                                          Replace an expense");
    println!("  delete <id>                             Delete an expense");
    println!("  export [path]                           Export expenses to CSV");
    println!("    --month <YYYY-MM>                     Only this month");
    println!("  summary [YYYY-MM]                       Print a monthly summary");
    println!("  top [n]                                 Show the largest expenses");
    println!("  ask <question>                          Ask the assistant");
    println!("  seed                                    Load sample expenses into an empty store");
    println!("  --help, -h                              Show this help");
    println!("  --version, -V                           Show version");
}

fn cli_add(args: &[String], db: &mut Database) -> Result<()> {
    if args.len() < 4 {
        anyhow::bail!("Usage: spendboard add <YYYY-MM-DD> <amount> <category> <description>");
    }
    let new = NewExpense::from_args(args)?;
    let expense = db.insert(&new)?;
    println!("Added #{}: {}", expense.id, describe(&expense));
    Ok(())
}

fn cli_update(args: &[String], db: &mut Database) -> Result<()> {
    if args.len() < 5 {
        anyhow::bail!(
            "Usage: spendboard update <id> <YYYY-MM-DD> <amount> <category> <description>"
        );
    }
    let id = parse_id(&args[0])?;
    let new = NewExpense::from_args(&args[1..])?;
    let expense = db.update(id, &new)?;
    println!("Updated #{}: {}", expense.id, describe(&expense));
    Ok(())
}

fn cli_delete(args: &[String], db: &mut Database) -> Result<()> {
    let raw = args
        .first()
        .ok_or_else(|| anyhow::anyhow!("Usage: spendboard delete <id>"))?;
    let id = parse_id(raw)?;
    if db.delete(id)? {
        println!("Deleted #{id}");
        Ok(())
    } else {
        anyhow::bail!("Expense #{id} not found")
    }
}

fn cli_list(args: &[String], db: &mut Database) -> Result<()> {
    let filter = list_filter(args)?;
    let expenses = db.list(&filter)?;
    if expenses.is_empty() {
        if filter.is_empty() {
            println!("No expenses");
        } else {
            println!("No expenses match the filter");
        }
        return Ok(());
    }

    print_table(&expenses);
    let total: rust_decimal::Decimal = expenses.iter().map(|e| e.amount).sum();
    println!("{}", "─".repeat(78));
    println!("{:<54} {:>10} ${:>10.2}", "", format!("{} rows", expenses.len()), total);
    Ok(())
}

fn cli_export(args: &[String], db: &mut Database, today: NaiveDate) -> Result<()> {
    let month = flag(args, "--month").map(parse_month).transpose()?;

    // Output path is the first non-flag argument
    let output_path = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| PathBuf::from(shellexpand(a)))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            let stamp = month
                .map(|m| m.format("%Y-%m").to_string())
                .unwrap_or_else(|| today.format("%Y-%m-%d").to_string());
            PathBuf::from(format!("{home}/spendboard-export-{stamp}.csv"))
        });

    let filter = ExpenseFilter {
        month: month.map(|m| m.format("%Y-%m").to_string()),
        ..ExpenseFilter::default()
    };
    let expenses = db.list(&filter)?;
    let count = crate::export::export_to_path(&output_path, &expenses)?;
    if count == 0 {
        println!("No expenses to export; wrote header to {}", output_path.display());
    } else {
        println!("Exported {count} expenses to {}", output_path.display());
    }
    Ok(())
}

fn cli_summary(
    args: &[String],
    db: &mut Database,
    settings: &Settings,
    today: NaiveDate,
) -> Result<()> {
    let first = match args.first().filter(|a| !a.starts_with('-')) {
        Some(raw) => parse_month(raw)?,
        None => analytics::first_of_month(today),
    };
    let reference = if first == analytics::first_of_month(today) {
        today
    } else {
        analytics::last_of_month(first)
    };

    let records = db.list_all()?;
    let kpis = Kpis::compute(&records, reference, settings.daily_window);
    let month_records = db.list(&ExpenseFilter::month(first.format("%Y-%m").to_string()))?;
    let spending = analytics::group_by_category(&month_records);

    println!("Spendboard: {}", first.format("%B %Y"));
    println!("{}", "─".repeat(40));
    println!("  Spent:        ${:.2}", kpis.month_total);
    println!("  Expenses:     {}", kpis.expense_count);
    println!(
        "  Daily avg:    ${:.2} (last {} days)",
        kpis.average_daily, settings.daily_window
    );
    if let Some((name, amount)) = &kpis.top_category {
        println!("  Top category: {name} (${amount:.2})");
    }
    println!("  All records:  {}", db.count()?);

    if !spending.is_empty() {
        println!();
        println!("Spending by Category:");
        for (name, amount) in &spending {
            println!("  {name:<24} ${amount:.2}");
        }
    }
    Ok(())
}

fn cli_top(args: &[String], db: &mut Database, settings: &Settings) -> Result<()> {
    let n = match args.first() {
        Some(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("Invalid count: {raw}"))?,
        None => settings.top_n,
    };
    let records = db.list_all()?;
    let top = analytics::top_n(&records, n);
    if top.is_empty() {
        println!("No expenses");
        return Ok(());
    }
    print_table(&top);
    Ok(())
}

fn cli_ask(
    args: &[String],
    db: &mut Database,
    settings: &Settings,
    today: NaiveDate,
) -> Result<()> {
    if args.is_empty() {
        anyhow::bail!("Usage: spendboard ask <question>");
    }
    let question = args.join(" ");
    let records = db.list_all()?;
    let reply = Assistant::new(settings.top_n).respond(&question, &records, today);

    let mut text = reply.text;
    if let Some(new) = reply.action {
        let expense = db.insert(&new)?;
        text.push_str(&format!(" (#{})", expense.id));
    }
    println!("{text}");
    Ok(())
}

fn cli_seed(db: &mut Database, today: NaiveDate) -> Result<()> {
    match db.seed_sample(today)? {
        0 => println!("Store already has expenses; nothing seeded"),
        n => println!("Seeded {n} sample expenses"),
    }
    Ok(())
}

// ── Helpers ──────────────────────────────────────────────────

fn print_table(expenses: &[Expense]) {
    println!(
        "{:<6} {:<10}  {:<36} {:<18} {:>10}",
        "ID", "Date", "Description", "Category", "Amount"
    );
    println!("{}", "─".repeat(78));
    for e in expenses {
        println!(
            "{:<6} {:<10}  {:<36} {:<18} {:>10.2}",
            e.id,
            e.date_str(),
            crate::ui::util::truncate(&e.description, 36),
            crate::ui::util::truncate(&e.category, 18),
            e.amount,
        );
    }
}

fn describe(expense: &Expense) -> String {
    format!(
        "{} ${:.2} ({}, {})",
        expense.description,
        expense.amount,
        expense.category,
        expense.date_str()
    )
}

fn parse_id(raw: &str) -> Result<i64> {
    raw.trim_start_matches('#')
        .parse::<i64>()
        .with_context(|| format!("Invalid expense id: {raw}"))
}

/// First day of a "YYYY-MM" month.
fn parse_month(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
        .with_context(|| format!("Invalid month (expected YYYY-MM): {raw}"))
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

fn list_filter(args: &[String]) -> Result<ExpenseFilter> {
    let month = flag(args, "--month")
        .map(|m| parse_month(m).map(|d| d.format("%Y-%m").to_string()))
        .transpose()?;
    let from = flag(args, "--from").map(parse_date).transpose()?;
    let to = flag(args, "--to").map(parse_date).transpose()?;
    let limit = flag(args, "--limit")
        .map(|raw| {
            raw.parse::<u32>()
                .with_context(|| format!("Invalid limit: {raw}"))
        })
        .transpose()?;

    Ok(ExpenseFilter {
        category: flag(args, "--category").map(str::to_string),
        search: flag(args, "--search").map(str::to_string),
        month,
        from,
        to,
        limit,
    })
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
