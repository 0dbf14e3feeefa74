use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use super::{StorageBackend, check_memo_name};
use crate::error::Result;

/// In-process storage. Backs tests and shells without a filesystem.
#[derive(Default)]
pub struct MemoryStorage {
    files: RwLock<HashMap<NaiveDate, String>>,
    memos: RwLock<HashMap<String, String>>,
    writes: RwLock<HashMap<NaiveDate, usize>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a date file without counting it as a write.
    pub async fn insert(&self, date: NaiveDate, text: impl Into<String>) {
        self.files.write().await.insert(date, text.into());
    }

    /// How many times `date` has been written through the backend.
    pub async fn write_count(&self, date: NaiveDate) -> usize {
        self.writes.read().await.get(&date).copied().unwrap_or(0)
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn read_date_file(&self, date: NaiveDate) -> Result<Option<String>> {
        Ok(self.files.read().await.get(&date).cloned())
    }

    async fn write_date_file(&self, date: NaiveDate, text: &str) -> Result<()> {
        self.files.write().await.insert(date, text.to_string());
        *self.writes.write().await.entry(date).or_default() += 1;
        Ok(())
    }

    async fn list_dates(&self) -> Result<Vec<NaiveDate>> {
        let mut dates: Vec<NaiveDate> = self.files.read().await.keys().copied().collect();
        dates.sort_unstable_by(|a, b| b.cmp(a));
        Ok(dates)
    }

    async fn read_memo(&self, name: &str) -> Result<Option<String>> {
        check_memo_name(name)?;
        Ok(self.memos.read().await.get(name).cloned())
    }

    async fn write_memo(&self, name: &str, text: &str) -> Result<()> {
        check_memo_name(name)?;
        self.memos.write().await.insert(name.to_string(), text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_writes_not_seeds() {
        let storage = MemoryStorage::new();
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        storage.insert(date, "seed").await;
        assert_eq!(storage.write_count(date).await, 0);

        storage.write_date_file(date, "one").await.unwrap();
        storage.write_date_file(date, "two").await.unwrap();
        assert_eq!(storage.write_count(date).await, 2);
        assert_eq!(storage.read_date_file(date).await.unwrap().as_deref(), Some("two"));
    }
}
