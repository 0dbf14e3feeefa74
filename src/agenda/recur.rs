use chrono::NaiveDate;

use crate::core::Todo;
use crate::error::Result;
use crate::store::{self, StorageBackend};

/// Schedule the next occurrence of a just-completed recurring to-do.
///
/// The successor goes into the file for the next occurrence date unless that
/// file already holds a to-do with the same text and recurrence. Returns the
/// date written, if any.
pub async fn project_successor(
    storage: &dyn StorageBackend,
    todo: &Todo,
    fallback: NaiveDate,
) -> Result<Option<NaiveDate>> {
    let Some(recurrence) = todo.recurrence else {
        return Ok(None);
    };
    if recurrence.interval == 0 {
        log::warn!("Not repeating {:?}: zero interval", todo.text);
        return Ok(None);
    }

    let from = todo.origin_or(fallback);
    let Some(next) = recurrence.next_date(from) else {
        log::warn!("Not repeating {:?}: {} after {} is out of range", todo.text, recurrence, from);
        return Ok(None);
    };
    let mut existing = store::load_todos(storage, next).await?;
    let scheduled = existing
        .iter()
        .any(|t| t.text == todo.text && t.recurrence == Some(recurrence));
    if scheduled {
        log::debug!("{:?} already scheduled for {}", todo.text, next);
        return Ok(None);
    }

    existing.push(todo.successor(next));
    store::save_todos(storage, next, &existing).await?;
    log::info!("Scheduled {:?} ({}) for {}", todo.text, recurrence, next);
    Ok(Some(next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Recurrence;
    use crate::markdown;
    use crate::store::MemoryStorage;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    #[tokio::test]
    async fn non_recurring_does_nothing() {
        let storage = MemoryStorage::new();
        let todo = Todo::on("once", day(1, 1));
        assert_eq!(project_successor(&storage, &todo, day(1, 1)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn monthly_successor_appended_after_existing() {
        let storage = MemoryStorage::new();
        storage.insert(day(2, 28), "- [ ] already there\n").await;
        let todo = Todo {
            completed: true,
            pinned: true,
            recurrence: Some(Recurrence::monthly(1)),
            ..Todo::on("rent", day(1, 31))
        };

        let next = project_successor(&storage, &todo, day(1, 31)).await.unwrap();
        assert_eq!(next, Some(day(2, 28)));

        let text = storage.read_date_file(day(2, 28)).await.unwrap().unwrap();
        let todos = markdown::decode(&text);
        assert_eq!(todos.len(), 2);
        assert_eq!(todos[0].text, "already there");
        assert_eq!(todos[1].text, "rent");
        assert!(!todos[1].completed && !todos[1].pinned);
        assert_eq!(todos[1].original_date, Some(day(2, 28)));
    }

    #[tokio::test]
    async fn different_interval_is_not_a_duplicate() {
        let storage = MemoryStorage::new();
        storage
            .insert(
                day(3, 2),
                "- [ ] stretch <!-- {\"recurrence\":{\"type\":\"daily\",\"interval\":2}} -->\n",
            )
            .await;
        let todo = Todo {
            recurrence: Some(Recurrence::daily(1)),
            ..Todo::on("stretch", day(3, 1))
        };
        assert_eq!(project_successor(&storage, &todo, day(3, 1)).await.unwrap(), Some(day(3, 2)));
    }

    #[tokio::test]
    async fn out_of_range_interval_is_skipped() {
        let storage = MemoryStorage::new();
        let line = "- [x] far <!-- {\"recurrence\":{\"type\":\"daily\",\"interval\":200000000}} -->";
        let todo = markdown::decode(line).remove(0);

        assert_eq!(project_successor(&storage, &todo, day(3, 1)).await.unwrap(), None);
        assert!(storage.list_dates().await.unwrap().is_empty());
    }
}
