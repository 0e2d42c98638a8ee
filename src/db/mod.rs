mod schema;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::error::{StoreError, StoreResult};
use crate::models::*;

pub(crate) struct Database {
    conn: Connection,
}

/// Raw column values as they come out of SQLite, before decimal/date parsing.
type RawRow = (i64, String, String, String, String);

const SELECT_COLUMNS: &str = "SELECT id, description, amount, category, date FROM expenses";

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            tracing::debug!(version = schema::CURRENT_VERSION, "bootstrapping fresh schema");
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        let tx = self.conn.transaction()?;
        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                tracing::debug!(from_version, "applying migration");
                tx.execute_batch(sql)?;
            }
        }
        if current < schema::CURRENT_VERSION {
            tx.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }
        tx.commit()?;

        Ok(())
    }

    // ── Expenses ──────────────────────────────────────────────

    pub(crate) fn insert(&self, expense: &NewExpense) -> StoreResult<Expense> {
        let id = insert_row(&self.conn, expense, &chrono::Utc::now().to_rfc3339())?;
        tracing::info!(id, category = expense.category(), "expense added");
        Ok(expense.clone().with_id(id))
    }

    /// Full replace of an existing record. There is no partial patch.
    pub(crate) fn update(&self, id: i64, expense: &NewExpense) -> StoreResult<Expense> {
        let changed = self.conn.execute(
            "UPDATE expenses SET description = ?1, amount = ?2, category = ?3, date = ?4
             WHERE id = ?5",
            params![
                expense.description(),
                expense.amount().to_string(),
                expense.category(),
                expense.date().format(DATE_FORMAT).to_string(),
                id,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        tracing::info!(id, "expense updated");
        Ok(expense.clone().with_id(id))
    }

    /// Returns `false` when no record had that id.
    pub(crate) fn delete(&self, id: i64) -> StoreResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM expenses WHERE id = ?1", params![id])?;
        if removed > 0 {
            tracing::info!(id, "expense deleted");
        }
        Ok(removed > 0)
    }

    pub(crate) fn get(&self, id: i64) -> StoreResult<Option<Expense>> {
        let result = self.conn.query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?1"),
            params![id],
            read_raw,
        );
        match result {
            Ok(raw) => Ok(Some(decode(raw)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn list(&self, filter: &ExpenseFilter) -> StoreResult<Vec<Expense>> {
        let mut sql = format!("{SELECT_COLUMNS} WHERE 1=1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(c) = &filter.category {
            sql.push_str(&format!(
                " AND category = ?{} COLLATE NOCASE",
                param_values.len() + 1
            ));
            param_values.push(Box::new(c.trim().to_string()));
        }
        if let Some(s) = &filter.search {
            sql.push_str(&format!(
                " AND (description LIKE ?{0} OR category LIKE ?{0})",
                param_values.len() + 1
            ));
            param_values.push(Box::new(format!("%{s}%")));
        }
        if let Some(m) = &filter.month {
            sql.push_str(&format!(" AND date LIKE ?{}", param_values.len() + 1));
            param_values.push(Box::new(format!("{m}-%")));
        }
        if let Some(from) = filter.from {
            sql.push_str(&format!(" AND date >= ?{}", param_values.len() + 1));
            param_values.push(Box::new(from.format(DATE_FORMAT).to_string()));
        }
        if let Some(to) = filter.to {
            sql.push_str(&format!(" AND date <= ?{}", param_values.len() + 1));
            param_values.push(Box::new(to.format(DATE_FORMAT).to_string()));
        }

        sql.push_str(" ORDER BY date DESC, id DESC");

        if let Some(l) = filter.limit {
            sql.push_str(&format!(" LIMIT {l}"));
        }

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), read_raw)?;
        let raw: Vec<RawRow> = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        raw.into_iter().map(decode).collect()
    }

    pub(crate) fn list_all(&self) -> StoreResult<Vec<Expense>> {
        self.list(&ExpenseFilter::default())
    }

    pub(crate) fn count(&self) -> StoreResult<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?)
    }

    /// Distinct stored categories, sorted case-insensitively.
    pub(crate) fn categories(&self) -> StoreResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT category FROM expenses ORDER BY category COLLATE NOCASE")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Populate an empty store with a few months of demo expenses ending at `today`.
    /// Returns the number of records inserted; existing data is never touched.
    pub(crate) fn seed_sample(&mut self, today: NaiveDate) -> StoreResult<usize> {
        if self.count()? > 0 {
            return Ok(0);
        }

        // (days before today, description, amount, category)
        let samples: [(i64, &str, &str, &str); 14] = [
            (0, "Coffee beans", "14.20", "Food"),
            (1, "Groceries", "24.50", "Food"),
            (2, "Bus ticket", "2.75", "Transport"),
            (4, "Cinema", "12.00", "Entertainment"),
            (7, "Electricity bill", "60.00", "Utilities"),
            (9, "Lunch with team", "18.40", "Food"),
            (13, "Taxi home", "21.90", "Transport"),
            (20, "Internet", "45.00", "Utilities"),
            (34, "Groceries", "57.35", "Food"),
            (38, "Concert tickets", "80.00", "Entertainment"),
            (41, "Electricity bill", "58.10", "Utilities"),
            (66, "Monthly bus pass", "55.00", "Transport"),
            (70, "Groceries", "49.99", "Food"),
            (72, "Electricity bill", "63.45", "Utilities"),
        ];

        let tx = self.conn.transaction()?;
        let now = chrono::Utc::now().to_rfc3339();
        for (days_ago, description, amount, category) in samples {
            let date = today - Duration::days(days_ago);
            let expense = NewExpense::new(
                description,
                amount,
                category,
                &date.format(DATE_FORMAT).to_string(),
            )?;
            insert_row(&tx, &expense, &now)?;
        }
        tx.commit()?;
        tracing::info!(count = samples.len(), "seeded sample expenses");
        Ok(samples.len())
    }
}

/// The one INSERT statement, shared by single inserts and seeding.
/// Takes a `Connection` or a `Transaction` (which derefs to one).
fn insert_row(conn: &Connection, expense: &NewExpense, created_at: &str) -> StoreResult<i64> {
    conn.execute(
        "INSERT INTO expenses (description, amount, category, date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            expense.description(),
            expense.amount().to_string(),
            expense.category(),
            expense.date().format(DATE_FORMAT).to_string(),
            created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn read_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn decode((id, description, amount, category, date): RawRow) -> StoreResult<Expense> {
    let amount =
        Decimal::from_str(&amount).map_err(|_| StoreError::Corrupt { id, field: "amount" })?;
    let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
        .map_err(|_| StoreError::Corrupt { id, field: "date" })?;
    Ok(Expense {
        id,
        description,
        amount,
        category,
        date,
    })
}
