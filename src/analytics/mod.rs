//! Expense aggregation for the dashboard, the assistant and the CLI summary.
//!
//! Every function here is a pure read over a snapshot of records: no store
//! access, no caching, same output for the same input. Callers re-fetch and
//! recompute after each mutation instead of patching results incrementally.
//! Sums use `Decimal`, so totals are exact and the grand total is preserved
//! across any grouping.

mod kpi;

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::models::Expense;

pub(crate) use kpi::{Dashboard, Kpis};

/// Label used when a record's category is blank.
pub(crate) const OTHER_CATEGORY: &str = "Other";

/// Parallel label/value vectors, ready to hand to a chart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Series {
    pub labels: Vec<String>,
    pub values: Vec<Decimal>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn total(&self) -> Decimal {
        self.values.iter().copied().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Total spent per category, largest first.
///
/// Ties keep the order in which the categories first appear in `records`.
pub(crate) fn group_by_category(records: &[Expense]) -> Vec<(String, Decimal)> {
    let mut totals: Vec<(String, Decimal)> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let name = match record.category.trim() {
            "" => OTHER_CATEGORY,
            name => name,
        };
        match slots.get(name) {
            Some(&slot) => totals[slot].1 += record.amount,
            None => {
                slots.insert(name, totals.len());
                totals.push((name.to_string(), record.amount));
            }
        }
    }

    // sort_by is stable, so equal totals stay in first-seen order
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals
}

/// `months_back` calendar-month buckets ending with the month of `reference`,
/// oldest first. Labels look like "Jul 2025"; empty months report zero.
pub(crate) fn bucket_by_month(
    records: &[Expense],
    months_back: usize,
    reference: NaiveDate,
) -> Series {
    let keys: Vec<(i32, u32)> = (0..months_back as i64)
        .rev()
        .map(|back| shift_month(reference.year(), reference.month(), back))
        .collect();

    let newest = month_index(reference);
    let mut values = vec![Decimal::ZERO; keys.len()];
    for record in records {
        let back = newest - month_index(record.date);
        if (0..months_back as i64).contains(&back) {
            values[months_back - 1 - back as usize] += record.amount;
        }
    }

    let labels = keys
        .iter()
        .map(|&(year, month)| {
            NaiveDate::from_ymd_opt(year, month, 1)
                .map(|d| d.format("%b %Y").to_string())
                .unwrap_or_else(|| format!("{year}-{month:02}"))
        })
        .collect();

    Series { labels, values }
}

/// `days_back` consecutive days ending at `reference`, oldest first.
/// Labels look like "Jul 05"; empty days report zero.
pub(crate) fn bucket_by_day(records: &[Expense], days_back: usize, reference: NaiveDate) -> Series {
    if days_back == 0 {
        return Series::default();
    }
    let Some(start) = i64::try_from(days_back - 1)
        .ok()
        .and_then(Duration::try_days)
        .and_then(|span| reference.checked_sub_signed(span))
    else {
        tracing::warn!(days_back, "daily window reaches past the calendar, skipping");
        return Series::default();
    };

    let mut values = vec![Decimal::ZERO; days_back];
    for record in records {
        if record.date < start || record.date > reference {
            continue;
        }
        let slot = (record.date - start).num_days() as usize;
        values[slot] += record.amount;
    }

    let labels = (0..days_back)
        .map(|offset| {
            (start + Duration::days(offset as i64))
                .format("%b %d")
                .to_string()
        })
        .collect();

    Series { labels, values }
}

/// Sum of amounts with `start <= date <= end`. An inverted range sums to zero.
pub(crate) fn total_in_range(records: &[Expense], start: NaiveDate, end: NaiveDate) -> Decimal {
    records
        .iter()
        .filter(|r| r.date >= start && r.date <= end)
        .map(|r| r.amount)
        .sum()
}

/// The `n` largest expenses: amount descending, then newest date, then lowest id.
pub(crate) fn top_n(records: &[Expense], n: usize) -> Vec<Expense> {
    if n == 0 {
        return Vec::new();
    }
    let mut sorted: Vec<&Expense> = records.iter().collect();
    sorted.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| b.date.cmp(&a.date))
            .then_with(|| a.id.cmp(&b.id))
    });
    sorted.into_iter().take(n).cloned().collect()
}

pub(crate) fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last calendar day of the month containing `date`.
pub(crate) fn last_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = shift_month(date.year(), date.month(), -1);
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month()) - 1
}

/// Step `back` months before (year, month); negative values step forward.
pub(crate) fn shift_month(year: i32, month: u32, back: i64) -> (i32, u32) {
    let index = i64::from(year) * 12 + i64::from(month) - 1 - back;
    (index.div_euclid(12) as i32, index.rem_euclid(12) as u32 + 1)
}
