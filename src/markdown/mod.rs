//! Markdown codec for per-date to-do files.
//!
//! Only checkbox lines carry data; headings and the timestamp line are
//! cosmetic. Extended fields ride along in a trailing HTML comment holding a
//! JSON object:
//!
//! ```text
//! - [ ] Buy milk <!-- {"pinned":true,"originalDate":"2026-02-03"} -->
//! ```

pub mod parser;
pub mod writer;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::core::reminder;
use crate::core::{Recurrence, Todo};

pub use parser::MarkdownParser;
pub use writer::MarkdownWriter;

/// The JSON blob in a line's trailing comment. Only set fields are written,
/// in this order.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Metadata {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pinned: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bookmarked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "reminder::serde_opt")]
    pub reminder: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
}

impl Metadata {
    pub fn from_todo(todo: &Todo) -> Self {
        Self {
            pinned: todo.pinned,
            bookmarked: todo.bookmarked,
            original_date: todo.original_date,
            reminder: todo.reminder,
            recurrence: todo.recurrence,
        }
    }

    pub fn apply(self, todo: &mut Todo) {
        todo.pinned = self.pinned;
        todo.bookmarked = self.bookmarked;
        todo.original_date = self.original_date;
        todo.reminder = self.reminder;
        todo.recurrence = self.recurrence;
    }
}

/// Decode a date file into to-dos. Never fails.
pub fn decode(input: &str) -> Vec<Todo> {
    MarkdownParser::parse(input)
}

/// Encode a date's to-dos into file text, stamped with the current local time.
pub fn encode(date: NaiveDate, todos: &[Todo]) -> String {
    MarkdownWriter::write_file(date, todos)
}
