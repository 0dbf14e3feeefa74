use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::scan::{RunRule, ScanLimits, scan_backward};
use crate::core::Todo;
use crate::error::Result;
use crate::store::{self, StorageBackend};

/// Default number of dates either backward walk may visit.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 365;

/// Consecutive empty dates that end the carry-over walk.
pub const CARRYOVER_EMPTY_RUN: u32 = 7;

/// Consecutive dates without bookmarks that end the bookmark walk.
pub const BOOKMARK_EMPTY_RUN: u32 = 30;

/// Bookmarked to-dos keyed by the date whose file holds them.
pub type BookmarksByDate = BTreeMap<NaiveDate, Vec<Todo>>;

/// The view for `focus`: pending to-dos carried over from earlier dates,
/// then the focus date's own to-dos.
///
/// Carried entries the focus file already holds (same text and owner) are
/// shown once, from the focus file.
pub async fn load_focus_view(
    storage: &dyn StorageBackend,
    focus: NaiveDate,
    max_days: u32,
) -> Result<Vec<Todo>> {
    let mut own = store::load_todos(storage, focus).await?;
    for todo in &mut own {
        todo.stamp_origin(focus);
    }

    let carried = collect_carryover(storage, focus, max_days).await?;
    let mut view: Vec<Todo> = carried
        .into_iter()
        .filter(|c| !own.iter().any(|t| t.same_entry(c)))
        .collect();
    log::debug!("View for {}: {} carried, {} own", focus, view.len(), own.len());

    view.extend(own);
    Ok(view)
}

/// Pending to-dos from the dates before `before`, oldest date first.
pub async fn collect_carryover(
    storage: &dyn StorageBackend,
    before: NaiveDate,
    max_days: u32,
) -> Result<Vec<Todo>> {
    let Some(start) = before.pred_opt() else {
        return Ok(Vec::new());
    };
    let limits = ScanLimits {
        max_days,
        run_limit: CARRYOVER_EMPTY_RUN,
        run_rule: RunRule::EmptyFile,
    };
    let days = scan_backward(storage, start, limits, |t| !t.completed).await?;

    let mut carried: Vec<Todo> = Vec::new();
    for todo in days.into_iter().rev().flat_map(|d| d.todos) {
        if !carried.iter().any(|c| c.same_entry(&todo)) {
            carried.push(todo);
        }
    }
    Ok(carried)
}

/// Bookmarked to-dos, completed or not, from `today` backward.
pub async fn collect_bookmarked(
    storage: &dyn StorageBackend,
    today: NaiveDate,
    max_days: u32,
) -> Result<BookmarksByDate> {
    let limits = ScanLimits {
        max_days,
        run_limit: BOOKMARK_EMPTY_RUN,
        run_rule: RunRule::NoMatch,
    };
    let days = scan_backward(storage, today, limits, |t| t.bookmarked).await?;
    Ok(days.into_iter().map(|d| (d.date, d.todos)).collect())
}
