use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::ValidationError;

/// Storage and display format for expense dates.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

static DATE_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap_or_else(|_| unreachable!("static pattern"))
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Expense {
    pub id: i64,
    pub description: String,
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDate,
}

impl Expense {
    pub fn date_str(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

/// A validated expense that has not been assigned an id yet.
///
/// Fields are private so the only way in is [`NewExpense::new`], which means
/// anything handed to the store already satisfies the record invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NewExpense {
    description: String,
    amount: Decimal,
    category: String,
    date: NaiveDate,
}

impl NewExpense {
    pub fn new(
        description: &str,
        amount: &str,
        category: &str,
        date: &str,
    ) -> Result<Self, ValidationError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        let category = category.trim();
        if category.is_empty() {
            return Err(ValidationError::EmptyCategory);
        }

        Ok(Self {
            description: description.to_string(),
            amount: parse_amount(amount)?,
            category: category.to_string(),
            date: parse_date(date)?,
        })
    }

    /// Positional form shared by the CLI and the `:add`/`:edit` commands:
    /// `<date> <amount> <category> <description...>`.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self, ValidationError> {
        let field = |i: usize| args.get(i).map(AsRef::as_ref).unwrap_or("");
        let description = args
            .iter()
            .skip(3)
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join(" ");
        Self::new(&description, field(1), field(2), field(0))
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub(crate) fn with_id(self, id: i64) -> Expense {
        Expense {
            id,
            description: self.description,
            amount: self.amount,
            category: self.category,
            date: self.date,
        }
    }
}

/// Parse a positive currency amount, tolerating a leading `$` and thousands commas.
pub(crate) fn parse_amount(raw: &str) -> Result<Decimal, ValidationError> {
    let cleaned = raw.trim().replace(['$', ','], "");
    let amount = Decimal::from_str(&cleaned)
        .map_err(|_| ValidationError::InvalidAmount(raw.trim().to_string()))?
        .round_dp(2);
    // Checked after rounding: sub-cent input must not be stored as 0.00
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount(raw.trim().to_string()));
    }
    Ok(amount)
}

/// Strict `YYYY-MM-DD`; no fallbacks, no partial dates.
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = raw.trim();
    if !DATE_SHAPE.is_match(trimmed) {
        return Err(ValidationError::InvalidDate(trimmed.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(trimmed.to_string()))
}
