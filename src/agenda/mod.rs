//! The cross-date to-do view and its mutations.
//!
//! An [`Agenda`] holds the view for one focus date: pending to-dos carried
//! over from earlier dates followed by the date's own. Every mutation builds
//! the full new list and hands it to [`merge::save`], which writes each
//! affected date file once. The in-memory list changes only after all writes
//! succeed.
//!
//! There is no locking: two agendas writing the same files concurrently can
//! lose each other's updates.

pub mod carryover;
pub mod merge;
pub mod recur;
pub mod scan;

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use crate::core::{Recurrence, Todo, TodoId};
use crate::error::{Error, Result};
use crate::store::StorageBackend;

pub use carryover::{
    BookmarksByDate, DEFAULT_LOOKBACK_DAYS, collect_bookmarked, collect_carryover, load_focus_view,
};
pub use merge::save;

pub struct Agenda {
    storage: Arc<dyn StorageBackend>,
    date: NaiveDate,
    lookback_days: u32,
    todos: Vec<Todo>,
}

impl Agenda {
    /// Load the view for `date`.
    pub async fn open(storage: Arc<dyn StorageBackend>, date: NaiveDate) -> Result<Self> {
        Self::open_with_lookback(storage, date, DEFAULT_LOOKBACK_DAYS).await
    }

    pub async fn open_with_lookback(
        storage: Arc<dyn StorageBackend>,
        date: NaiveDate,
        lookback_days: u32,
    ) -> Result<Self> {
        let todos = load_focus_view(storage.as_ref(), date, lookback_days).await?;
        Ok(Self { storage, date, lookback_days, todos })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn storage(&self) -> &Arc<dyn StorageBackend> {
        &self.storage
    }

    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// Whether `todo` belongs to an earlier date than the one in focus.
    pub fn is_carried(&self, todo: &Todo) -> bool {
        todo.origin_or(self.date) < self.date
    }

    pub fn position(&self, id: TodoId) -> Result<usize> {
        self.todos
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::InvalidArgument(format!("no to-do with id {}", id)))
    }

    /// Reload the view from storage.
    pub async fn refresh(&mut self) -> Result<()> {
        self.todos = load_focus_view(self.storage.as_ref(), self.date, self.lookback_days).await?;
        Ok(())
    }

    /// Move the focus to another date and load its view.
    pub async fn set_date(&mut self, date: NaiveDate) -> Result<()> {
        let todos = load_focus_view(self.storage.as_ref(), date, self.lookback_days).await?;
        self.date = date;
        self.todos = todos;
        Ok(())
    }

    /// Persist `todos` as the new view.
    pub async fn save(&mut self, todos: Vec<Todo>) -> Result<()> {
        merge::save(self.storage.as_ref(), self.date, &self.todos, &todos).await?;
        self.todos = todos;
        Ok(())
    }

    /// Bookmarked to-dos across dates, counting back from today whatever
    /// date is in focus.
    pub async fn bookmarks(&self) -> Result<BookmarksByDate> {
        self.bookmarks_as_of(chrono::Local::now().date_naive()).await
    }

    pub async fn bookmarks_as_of(&self, today: NaiveDate) -> Result<BookmarksByDate> {
        collect_bookmarked(self.storage.as_ref(), today, self.lookback_days).await
    }

    pub async fn add_todo(&mut self, text: &str, reminder: Option<NaiveDateTime>) -> Result<TodoId> {
        let text = checked_text(text)?;
        let todo = Todo {
            reminder,
            ..Todo::on(text, self.date)
        };
        let id = todo.id;
        let mut todos = self.todos.clone();
        todos.push(todo);
        self.save(todos).await?;
        Ok(id)
    }

    /// Flip completion. Completing a recurring to-do schedules its next
    /// occurrence; returns that date when one was written.
    pub async fn toggle_todo(&mut self, id: TodoId) -> Result<Option<NaiveDate>> {
        let todos = self.modified(id, |t| t.completed = !t.completed)?;
        let index = self.position(id)?;
        let toggled = todos[index].clone();
        self.save(todos).await?;

        if !toggled.completed {
            return Ok(None);
        }
        let next = recur::project_successor(self.storage.as_ref(), &toggled, self.date).await?;
        if next.is_some_and(|d| d <= self.date) {
            self.refresh().await?;
        }
        Ok(next)
    }

    pub async fn toggle_pin(&mut self, id: TodoId) -> Result<()> {
        let todos = self.modified(id, |t| t.pinned = !t.pinned)?;
        self.save(todos).await
    }

    pub async fn toggle_bookmark(&mut self, id: TodoId) -> Result<()> {
        let todos = self.modified(id, |t| t.bookmarked = !t.bookmarked)?;
        self.save(todos).await
    }

    pub async fn delete_todo(&mut self, id: TodoId) -> Result<()> {
        let index = self.position(id)?;
        let mut todos = self.todos.clone();
        todos.remove(index);
        self.save(todos).await
    }

    /// Replace text, reminder and recurrence. `None` clears the field.
    pub async fn update_todo(
        &mut self,
        id: TodoId,
        text: &str,
        reminder: Option<NaiveDateTime>,
        recurrence: Option<Recurrence>,
    ) -> Result<()> {
        let text = checked_text(text)?;
        let todos = self.modified(id, |t| {
            t.text = text;
            t.reminder = reminder;
            t.recurrence = recurrence;
        })?;
        self.save(todos).await
    }

    pub async fn clear_reminder(&mut self, id: TodoId) -> Result<()> {
        let todos = self.modified(id, |t| t.reminder = None)?;
        self.save(todos).await
    }

    /// Move the entry at `from` so it ends up at `to`.
    pub async fn reorder_todos(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.todos.len();
        if from >= len || to >= len {
            return Err(Error::InvalidArgument(format!(
                "cannot move {} to {} in a list of {}",
                from, to, len
            )));
        }
        let mut todos = self.todos.clone();
        let todo = todos.remove(from);
        todos.insert(to, todo);
        self.save(todos).await
    }

    fn modified(&self, id: TodoId, change: impl FnOnce(&mut Todo)) -> Result<Vec<Todo>> {
        let index = self.position(id)?;
        let mut todos = self.todos.clone();
        change(&mut todos[index]);
        Ok(todos)
    }
}

fn checked_text(text: &str) -> Result<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::InvalidArgument("to-do text is empty".into()));
    }
    Ok(text.to_string())
}
