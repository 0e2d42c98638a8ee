use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{
    bucket_by_day, bucket_by_month, first_of_month, group_by_category, total_in_range, Series,
};
use crate::models::Expense;

/// Headline numbers for the summary cards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Kpis {
    /// Spent from the first of the reference month up to the reference date.
    pub month_total: Decimal,
    /// Mean over the trailing daily window, zero-filled days included.
    pub average_daily: Decimal,
    pub top_category: Option<(String, Decimal)>,
    /// Records counted in `month_total`.
    pub expense_count: usize,
}

impl Kpis {
    pub fn compute(records: &[Expense], reference: NaiveDate, daily_window: usize) -> Self {
        let month = in_month(records, reference);

        let average_daily = if daily_window == 0 {
            Decimal::ZERO
        } else {
            let window = bucket_by_day(records, daily_window, reference);
            (window.total() / Decimal::from(daily_window)).round_dp(2)
        };

        Self {
            month_total: total_in_range(records, first_of_month(reference), reference),
            average_daily,
            top_category: group_by_category(&month).into_iter().next(),
            expense_count: month.len(),
        }
    }
}

/// Everything the dashboard screen draws, recomputed from a fresh snapshot.
#[derive(Debug, Clone, Default)]
pub(crate) struct Dashboard {
    pub kpis: Kpis,
    pub by_category: Vec<(String, Decimal)>,
    pub monthly: Series,
    pub daily: Series,
}

impl Dashboard {
    pub fn compute(
        records: &[Expense],
        reference: NaiveDate,
        months_window: usize,
        daily_window: usize,
    ) -> Self {
        Self {
            kpis: Kpis::compute(records, reference, daily_window),
            by_category: group_by_category(&in_month(records, reference)),
            monthly: bucket_by_month(records, months_window, reference),
            daily: bucket_by_day(records, daily_window, reference),
        }
    }
}

/// Month-to-date: the first of the reference month through the reference day.
fn in_month(records: &[Expense], reference: NaiveDate) -> Vec<Expense> {
    let start = first_of_month(reference);
    records
        .iter()
        .filter(|r| r.date >= start && r.date <= reference)
        .cloned()
        .collect()
}
