use anyhow::Result;
use chrono::NaiveDate;

use crate::analytics::{first_of_month, last_of_month, Dashboard};
use crate::assistant::Assistant;
use crate::config::Settings;
use crate::db::Database;
use crate::models::{Expense, ExpenseFilter};
use crate::ui::util::clamp_cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Dashboard,
    Expenses,
    Assistant,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Dashboard, Self::Expenses, Self::Assistant]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dashboard => write!(f, "Dashboard"),
            Self::Expenses => write!(f, "Expenses"),
            Self::Assistant => write!(f, "Assistant"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Search,
    Editing,
    Confirm,
    Chat,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Search => write!(f, "SEARCH"),
            Self::Editing => write!(f, "EDIT"),
            Self::Confirm => write!(f, "CONFIRM"),
            Self::Chat => write!(f, "CHAT"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PendingAction {
    DeleteExpense { id: i64, description: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChatMessage {
    pub(crate) speaker: Speaker,
    pub(crate) text: String,
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) search_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,

    /// Real calendar date; the assistant always answers relative to it.
    pub(crate) today: NaiveDate,
    /// First day of the month being viewed.
    pub(crate) month: NaiveDate,
    pub(crate) months_window: usize,
    pub(crate) daily_window: usize,

    // Snapshot of the whole store, re-read after every mutation
    pub(crate) records: Vec<Expense>,
    pub(crate) dashboard: Dashboard,
    pub(crate) expense_count: i64,
    pub(crate) categories: Vec<String>,

    // Expenses
    pub(crate) expenses: Vec<Expense>,
    pub(crate) expense_index: usize,
    pub(crate) expense_scroll: usize,
    pub(crate) category_filter: Option<String>,
    /// Id of the expense being edited; `None` while composing a new one.
    pub(crate) editing_id: Option<i64>,

    // Assistant
    pub(crate) assistant: Assistant,
    pub(crate) chat: Vec<ChatMessage>,
    pub(crate) chat_input: String,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(settings: &Settings, today: NaiveDate) -> Self {
        Self {
            running: true,
            screen: Screen::Dashboard,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            search_input: String::new(),
            status_message: String::new(),
            show_help: false,

            today,
            month: first_of_month(today),
            months_window: settings.months_window,
            daily_window: settings.daily_window,

            records: Vec::new(),
            dashboard: Dashboard::default(),
            expense_count: 0,
            categories: Vec::new(),

            expenses: Vec::new(),
            expense_index: 0,
            expense_scroll: 0,
            category_filter: None,
            editing_id: None,

            assistant: Assistant::new(settings.top_n),
            chat: vec![ChatMessage {
                speaker: Speaker::Assistant,
                text: format!("Hi! {}", crate::assistant::help_text()),
            }],
            chat_input: String::new(),

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    /// Date the dashboard is computed against: today for the current month,
    /// otherwise the last day of the viewed month.
    pub(crate) fn reference_date(&self) -> NaiveDate {
        if self.month == first_of_month(self.today) {
            self.today
        } else {
            last_of_month(self.month)
        }
    }

    pub(crate) fn month_key(&self) -> String {
        self.month.format("%Y-%m").to_string()
    }

    /// Re-read everything from the store and recompute all derived views.
    pub(crate) fn refresh_all(&mut self, db: &Database) -> Result<()> {
        self.records = db.list_all()?;
        self.expense_count = db.count()?;
        self.categories = db.categories()?;
        self.recompute_dashboard();
        self.refresh_expenses(db)?;
        Ok(())
    }

    pub(crate) fn recompute_dashboard(&mut self) {
        self.dashboard = Dashboard::compute(
            &self.records,
            self.reference_date(),
            self.months_window,
            self.daily_window,
        );
    }

    pub(crate) fn expense_filter(&self) -> ExpenseFilter {
        let search = self.search_input.trim();
        ExpenseFilter {
            category: self.category_filter.clone(),
            search: (!search.is_empty()).then(|| search.to_string()),
            ..ExpenseFilter::month(self.month_key())
        }
    }

    pub(crate) fn refresh_expenses(&mut self, db: &Database) -> Result<()> {
        self.expenses = db.list(&self.expense_filter())?;
        clamp_cursor(
            &mut self.expense_index,
            &mut self.expense_scroll,
            self.expenses.len(),
        );
        Ok(())
    }

    pub(crate) fn selected_expense(&self) -> Option<&Expense> {
        self.expenses.get(self.expense_index)
    }

    /// Move the viewed month by `delta` months and recompute.
    pub(crate) fn shift_month(&mut self, delta: i64, db: &Database) -> Result<()> {
        let (year, month) = crate::analytics::shift_month(
            chrono::Datelike::year(&self.month),
            chrono::Datelike::month(&self.month),
            -delta,
        );
        if let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) {
            self.set_month(first, db)?;
        }
        Ok(())
    }

    pub(crate) fn set_month(&mut self, month: NaiveDate, db: &Database) -> Result<()> {
        self.month = first_of_month(month);
        self.expense_index = 0;
        self.expense_scroll = 0;
        self.recompute_dashboard();
        self.refresh_expenses(db)
    }

    pub(crate) fn push_chat(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.chat.push(ChatMessage {
            speaker,
            text: text.into(),
        });
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}
