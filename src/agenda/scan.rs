use chrono::NaiveDate;

use crate::core::Todo;
use crate::error::Result;
use crate::store::{self, StorageBackend};

/// Which dates count toward the run that ends a backward scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunRule {
    /// Dates whose file holds no to-dos at all (or doesn't exist).
    EmptyFile,
    /// Dates with no to-do passing the scan's filter.
    NoMatch,
}

/// Bounds for [`scan_backward`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanLimits {
    /// Dates visited before giving up, whatever their contents.
    pub max_days: u32,
    /// Consecutive run of counted dates that ends the scan.
    pub run_limit: u32,
    pub run_rule: RunRule,
}

/// To-dos matched on one visited date.
#[derive(Debug, Clone)]
pub struct DayMatches {
    pub date: NaiveDate,
    pub todos: Vec<Todo>,
}

/// Walk backward one day at a time from `start` (inclusive), collecting the
/// to-dos `keep` accepts. Matches get their owning date stamped if the file
/// didn't record one.
///
/// Results are in visit order, newest date first. Dates with no matches are
/// left out.
pub async fn scan_backward<F>(
    storage: &dyn StorageBackend,
    start: NaiveDate,
    limits: ScanLimits,
    mut keep: F,
) -> Result<Vec<DayMatches>>
where
    F: FnMut(&Todo) -> bool,
{
    let mut found = Vec::new();
    let mut date = start;
    let mut run = 0u32;

    for _ in 0..limits.max_days {
        let todos = store::load_todos(storage, date).await?;
        let total = todos.len();
        let mut matched: Vec<Todo> = todos.into_iter().filter(|t| keep(t)).collect();
        for todo in &mut matched {
            todo.stamp_origin(date);
        }

        let counted = match limits.run_rule {
            RunRule::EmptyFile => total == 0,
            RunRule::NoMatch => matched.is_empty(),
        };
        if counted {
            run += 1;
            if run >= limits.run_limit {
                log::debug!("Backward scan from {} stopped at {} after {} quiet days", start, date, run);
                break;
            }
        } else {
            run = 0;
        }

        if !matched.is_empty() {
            found.push(DayMatches { date, todos: matched });
        }

        match date.pred_opt() {
            Some(prev) => date = prev,
            None => break,
        }
    }

    Ok(found)
}
