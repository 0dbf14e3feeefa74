use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::recurrence::Recurrence;
use super::reminder;

/// In-memory handle for a loaded to-do. Never written to disk.
pub type TodoId = Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    #[serde(skip, default = "Uuid::new_v4")]
    pub id: TodoId,
    pub text: String,
    pub completed: bool,
    /// The date whose file owns this to-do.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pinned: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bookmarked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "reminder::serde_opt")]
    pub reminder: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
}

impl Todo {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            completed: false,
            original_date: None,
            pinned: false,
            bookmarked: false,
            reminder: None,
            recurrence: None,
        }
    }

    /// A fresh pending to-do owned by `date`.
    pub fn on(text: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            original_date: Some(date),
            ..Self::new(text)
        }
    }

    /// The owning date, falling back to `default` for legacy entries.
    pub fn origin_or(&self, default: NaiveDate) -> NaiveDate {
        self.original_date.unwrap_or(default)
    }

    /// Fill in the owning date if the file didn't record one.
    pub fn stamp_origin(&mut self, date: NaiveDate) {
        if self.original_date.is_none() {
            self.original_date = Some(date);
        }
    }

    /// Whether `other` refers to the same stored entry: same text, same owner.
    pub fn same_entry(&self, other: &Todo) -> bool {
        self.text == other.text && self.original_date == other.original_date
    }

    pub fn has_metadata(&self) -> bool {
        self.pinned
            || self.bookmarked
            || self.original_date.is_some()
            || self.reminder.is_some()
            || self.recurrence.is_some()
    }

    /// The pending to-do a completed recurring one schedules on `date`.
    ///
    /// Pin, bookmark and reminder stay with the completed entry.
    pub fn successor(&self, date: NaiveDate) -> Self {
        Self {
            recurrence: self.recurrence,
            ..Self::on(self.text.clone(), date)
        }
    }
}

/// Display order within a day: pinned pending, other pending, completed.
/// Stable within each group.
pub fn display_order(todos: &[Todo]) -> Vec<&Todo> {
    let pinned = todos.iter().filter(|t| t.pinned && !t.completed);
    let pending = todos.iter().filter(|t| !t.pinned && !t.completed);
    let done = todos.iter().filter(|t| t.completed);
    pinned.chain(pending).chain(done).collect()
}
