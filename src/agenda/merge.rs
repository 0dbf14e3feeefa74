use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::core::Todo;
use crate::error::Result;
use crate::store::{self, StorageBackend};

/// Group to-dos by owning date, stamping `focus` on any without one.
/// Order within each date is preserved.
pub fn group_by_origin(todos: &[Todo], focus: NaiveDate) -> BTreeMap<NaiveDate, Vec<Todo>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<Todo>> = BTreeMap::new();
    for todo in todos {
        let mut todo = todo.clone();
        todo.stamp_origin(focus);
        grouped.entry(todo.origin_or(focus)).or_default().push(todo);
    }
    grouped
}

/// Write an edited view back to the files that own its entries.
///
/// `previous` is what the view loaded, `next` what it holds now. Every date
/// owning an entry in either is re-read and rewritten once: entries the view
/// had loaded are replaced by the view's current entries for that date, and
/// anything else in the file is kept after them.
///
/// Returns the dates written, oldest first.
pub async fn save(
    storage: &dyn StorageBackend,
    focus: NaiveDate,
    previous: &[Todo],
    next: &[Todo],
) -> Result<Vec<NaiveDate>> {
    let mut next_by_date = group_by_origin(next, focus);
    let prev_by_date = group_by_origin(previous, focus);

    let dates: BTreeSet<NaiveDate> = next_by_date
        .keys()
        .chain(prev_by_date.keys())
        .copied()
        .collect();

    let mut written = Vec::with_capacity(dates.len());
    for date in dates {
        let stored = store::load_todos(storage, date).await?;
        let loaded = prev_by_date.get(&date).map(Vec::as_slice).unwrap_or(&[]);
        let untouched: Vec<Todo> = stored
            .into_iter()
            .filter(|s| !loaded.iter().any(|p| p.text == s.text))
            .collect();
        if !untouched.is_empty() {
            log::debug!("Keeping {} entries in {} the view never loaded", untouched.len(), date);
        }

        let mut content = next_by_date.remove(&date).unwrap_or_default();
        content.extend(untouched);
        store::save_todos(storage, date, &content).await?;
        written.push(date);
    }

    Ok(written)
}
