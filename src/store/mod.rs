//! Byte-level persistence for date files and memos.
//!
//! Each platform shell picks one backend at startup and hands it to the
//! agenda as `Arc<dyn StorageBackend>`.

pub mod cached;
pub mod fs;
pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::core::Todo;
use crate::error::{Error, Result};
use crate::markdown;

pub use cached::CachedStorage;
pub use fs::FsStorage;
pub use memory::MemoryStorage;

#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Raw text of the file for `date`, or `None` if there isn't one.
    async fn read_date_file(&self, date: NaiveDate) -> Result<Option<String>>;

    /// Replace the file for `date` with `text`.
    async fn write_date_file(&self, date: NaiveDate, text: &str) -> Result<()>;

    /// Every date that has a file, newest first.
    async fn list_dates(&self) -> Result<Vec<NaiveDate>>;

    async fn read_memo(&self, name: &str) -> Result<Option<String>>;

    async fn write_memo(&self, name: &str, text: &str) -> Result<()>;
}

/// Read and decode the to-dos stored for `date`. A missing file is empty.
pub async fn load_todos(storage: &dyn StorageBackend, date: NaiveDate) -> Result<Vec<Todo>> {
    let text = storage.read_date_file(date).await?;
    Ok(text.as_deref().map(markdown::decode).unwrap_or_default())
}

/// Encode and write the to-dos for `date`, replacing the whole file.
pub async fn save_todos(storage: &dyn StorageBackend, date: NaiveDate, todos: &[Todo]) -> Result<()> {
    let text = markdown::encode(date, todos);
    storage.write_date_file(date, &text).await?;
    log::info!("Wrote {} to-dos to {}", todos.len(), date);
    Ok(())
}

/// File name for a date: `2026-02-03.md`.
pub fn date_file_name(date: NaiveDate) -> String {
    format!("{}.md", date.format("%Y-%m-%d"))
}

/// Inverse of [`date_file_name`]; anything else is `None`.
pub fn parse_date_file_name(name: &str) -> Option<NaiveDate> {
    let stem = name.strip_suffix(".md")?;
    if stem.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(stem, "%Y-%m-%d").ok()
}

/// Memo names become file names, so they can't contain path separators.
pub(crate) fn check_memo_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return Err(Error::InvalidArgument(format!("bad memo name: {:?}", name)));
    }
    Ok(())
}
