use chrono::NaiveDate;

/// Optional constraints for listing expenses. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ExpenseFilter {
    /// Case-insensitive exact match against the stored category.
    pub category: Option<String>,
    /// Substring match over description and category.
    pub search: Option<String>,
    /// Format: "YYYY-MM"
    pub month: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<u32>,
}

impl ExpenseFilter {
    pub fn month(month: impl Into<String>) -> Self {
        Self {
            month: Some(month.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
