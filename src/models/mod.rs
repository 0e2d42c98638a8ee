mod expense;
mod filter;

pub(crate) use expense::{parse_amount, parse_date, Expense, NewExpense, DATE_FORMAT};
pub(crate) use filter::ExpenseFilter;
