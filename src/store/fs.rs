use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{StorageBackend, check_memo_name, date_file_name, parse_date_file_name};
use crate::error::{Error, Result};

/// Date files under a vault's TODO folder, memos under `TODO/memo`.
pub struct FsStorage {
    todo_dir: PathBuf,
}

impl FsStorage {
    pub fn new(todo_dir: impl Into<PathBuf>) -> Self {
        Self { todo_dir: todo_dir.into() }
    }

    pub fn todo_dir(&self) -> &Path {
        &self.todo_dir
    }

    pub fn memo_dir(&self) -> PathBuf {
        self.todo_dir.join("memo")
    }

    pub fn date_path(&self, date: NaiveDate) -> PathBuf {
        self.todo_dir.join(date_file_name(date))
    }

    async fn ensure_dir(path: &Path) -> Result<()> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| Error::io(path, e))
    }

    async fn read_optional(path: &Path) -> std::io::Result<Option<String>> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl StorageBackend for FsStorage {
    async fn read_date_file(&self, date: NaiveDate) -> Result<Option<String>> {
        Self::read_optional(&self.date_path(date))
            .await
            .map_err(|source| Error::Read { date, source })
    }

    async fn write_date_file(&self, date: NaiveDate, text: &str) -> Result<()> {
        Self::ensure_dir(&self.todo_dir).await?;
        tokio::fs::write(self.date_path(date), text)
            .await
            .map_err(|source| Error::Write { date, source })
    }

    async fn list_dates(&self) -> Result<Vec<NaiveDate>> {
        let mut entries = match tokio::fs::read_dir(&self.todo_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io(&self.todo_dir, e)),
        };

        let mut dates = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::io(&self.todo_dir, e))?
        {
            if let Some(date) = entry.file_name().to_str().and_then(parse_date_file_name) {
                dates.push(date);
            }
        }
        dates.sort_unstable_by(|a, b| b.cmp(a));
        Ok(dates)
    }

    async fn read_memo(&self, name: &str) -> Result<Option<String>> {
        check_memo_name(name)?;
        let path = self.memo_dir().join(format!("{}.md", name));
        Self::read_optional(&path).await.map_err(|e| Error::io(&path, e))
    }

    async fn write_memo(&self, name: &str, text: &str) -> Result<()> {
        check_memo_name(name)?;
        let dir = self.memo_dir();
        Self::ensure_dir(&dir).await?;
        let path = dir.join(format!("{}.md", name));
        tokio::fs::write(&path, text).await.map_err(|e| Error::io(&path, e))
    }
}
