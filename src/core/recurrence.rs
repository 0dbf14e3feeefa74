use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a recurring to-do repeats once completed.
///
/// Serialized inline in the metadata comment as
/// `{"type":"daily","interval":1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    #[serde(rename = "type")]
    pub kind: RecurrenceKind,
    pub interval: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    Daily,
    Weekly,
    Monthly,
}

impl Recurrence {
    pub fn daily(interval: u32) -> Self {
        Self { kind: RecurrenceKind::Daily, interval }
    }

    pub fn weekly(interval: u32) -> Self {
        Self { kind: RecurrenceKind::Weekly, interval }
    }

    pub fn monthly(interval: u32) -> Self {
        Self { kind: RecurrenceKind::Monthly, interval }
    }

    /// The date of the next occurrence after `from`, or `None` when it
    /// falls outside the calendar. Monthly steps clamp the day to the
    /// target month's length.
    pub fn next_date(&self, from: NaiveDate) -> Option<NaiveDate> {
        match self.kind {
            RecurrenceKind::Daily => from.checked_add_days(Days::new(u64::from(self.interval))),
            RecurrenceKind::Weekly => from.checked_add_days(Days::new(u64::from(self.interval) * 7)),
            RecurrenceKind::Monthly => from.checked_add_months(Months::new(self.interval)),
        }
    }

    /// Parse the short form used by the CLI: "1d", "2w", "3m".
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let unit = s.chars().last()?;
        let interval: u32 = s[..s.len() - unit.len_utf8()].parse().ok()?;
        if interval == 0 {
            return None;
        }
        let kind = match unit {
            'd' => RecurrenceKind::Daily,
            'w' => RecurrenceKind::Weekly,
            'm' => RecurrenceKind::Monthly,
            _ => return None,
        };
        Some(Self { kind, interval })
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.kind {
            RecurrenceKind::Daily => "d",
            RecurrenceKind::Weekly => "w",
            RecurrenceKind::Monthly => "m",
        };
        write!(f, "{}{}", self.interval, unit)
    }
}
