use std::collections::HashSet;

use chrono::{NaiveDateTime, Timelike};

use super::todo::{Todo, TodoId};

/// How long after its time a reminder still counts as due.
pub const DUE_WINDOW_SECS: i64 = 60;

const MINUTE_FORMAT: &str = "%Y-%m-%dT%H:%M";
const SECOND_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Format a reminder the way date-time pickers emit it: minutes, plus
/// seconds only when they're set.
pub fn format(ts: NaiveDateTime) -> String {
    if ts.second() == 0 {
        ts.format(MINUTE_FORMAT).to_string()
    } else {
        ts.format(SECOND_FORMAT).to_string()
    }
}

pub fn parse(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, MINUTE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, SECOND_FORMAT))
        .ok()
}

/// Serde adapter for `Option<NaiveDateTime>` reminder fields.
pub mod serde_opt {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<NaiveDateTime>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => s.serialize_str(&super::format(*ts)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw {
            None => Ok(None),
            Some(s) if s.is_empty() => Ok(None),
            Some(s) => super::parse(&s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid reminder time: {s}"))),
        }
    }
}

/// Tracks which reminders have already fired so each one fires once.
#[derive(Debug, Default)]
pub struct ReminderTracker {
    notified: HashSet<(String, NaiveDateTime)>,
}

impl ReminderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of pending to-dos whose reminder fell within the last minute and
    /// hasn't fired yet. Marks them as fired.
    pub fn due(&mut self, todos: &[Todo], now: NaiveDateTime) -> Vec<TodoId> {
        let mut due = Vec::new();
        for todo in todos {
            let Some(at) = todo.reminder else { continue };
            if todo.completed {
                continue;
            }
            let elapsed = (now - at).num_seconds();
            if !(0..DUE_WINDOW_SECS).contains(&elapsed) {
                continue;
            }
            if self.notified.insert((todo.text.clone(), at)) {
                log::info!("Reminder due: {}", todo.text);
                due.push(todo.id);
            }
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 4, 1).unwrap().and_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn format_and_parse() {
        assert_eq!(format(at(9, 30, 0)), "2026-04-01T09:30");
        assert_eq!(format(at(9, 30, 15)), "2026-04-01T09:30:15");
        assert_eq!(parse("2026-04-01T09:30"), Some(at(9, 30, 0)));
        assert_eq!(parse("2026-04-01T09:30:15"), Some(at(9, 30, 15)));
        assert_eq!(parse("tomorrow"), None);
    }

    #[test]
    fn fires_once_within_window() {
        let todo = Todo { reminder: Some(at(9, 0, 0)), ..Todo::new("call mom") };
        let todos = vec![todo.clone()];
        let mut tracker = ReminderTracker::new();

        assert!(tracker.due(&todos, at(8, 59, 59)).is_empty());
        assert_eq!(tracker.due(&todos, at(9, 0, 30)), vec![todo.id]);
        assert!(tracker.due(&todos, at(9, 0, 40)).is_empty());
    }

    #[test]
    fn skips_completed_and_stale() {
        let done = Todo {
            completed: true,
            reminder: Some(at(9, 0, 0)),
            ..Todo::new("done")
        };
        let stale = Todo { reminder: Some(at(8, 0, 0)), ..Todo::new("stale") };
        let mut tracker = ReminderTracker::new();
        assert!(tracker.due(&[done, stale], at(9, 0, 10)).is_empty());
    }
}
