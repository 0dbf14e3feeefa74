use async_trait::async_trait;
use chrono::NaiveDate;

use super::StorageBackend;
use crate::error::Result;

/// A local cache in front of a secondary backend.
///
/// Reads prefer the cache; a file only found on the secondary is copied into
/// the cache. A date the cache lacks and the secondary can't read is an
/// error, not an empty file. Writes land in the cache first, so a failing
/// secondary costs nothing but a warning.
pub struct CachedStorage<C, S> {
    cache: C,
    secondary: S,
}

impl<C: StorageBackend, S: StorageBackend> CachedStorage<C, S> {
    pub fn new(cache: C, secondary: S) -> Self {
        Self { cache, secondary }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn secondary(&self) -> &S {
        &self.secondary
    }
}

#[async_trait]
impl<C: StorageBackend, S: StorageBackend> StorageBackend for CachedStorage<C, S> {
    async fn read_date_file(&self, date: NaiveDate) -> Result<Option<String>> {
        if let Some(text) = self.cache.read_date_file(date).await? {
            return Ok(Some(text));
        }
        match self.secondary.read_date_file(date).await {
            Ok(Some(text)) => {
                if !text.trim().is_empty() {
                    self.cache.write_date_file(date, &text).await?;
                }
                Ok(Some(text))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                log::warn!("Secondary read of {} failed with no cached copy: {}", date, e);
                Err(e)
            }
        }
    }

    async fn write_date_file(&self, date: NaiveDate, text: &str) -> Result<()> {
        self.cache.write_date_file(date, text).await?;
        if let Err(e) = self.secondary.write_date_file(date, text).await {
            log::warn!("Secondary write of {} failed, kept in cache: {}", date, e);
        }
        Ok(())
    }

    async fn list_dates(&self) -> Result<Vec<NaiveDate>> {
        let mut dates = self.cache.list_dates().await?;
        match self.secondary.list_dates().await {
            Ok(more) => dates.extend(more),
            Err(e) => log::warn!("Secondary listing failed: {}", e),
        }
        dates.sort_unstable_by(|a, b| b.cmp(a));
        dates.dedup();
        Ok(dates)
    }

    async fn read_memo(&self, name: &str) -> Result<Option<String>> {
        if let Some(text) = self.cache.read_memo(name).await? {
            return Ok(Some(text));
        }
        match self.secondary.read_memo(name).await {
            Ok(text) => Ok(text),
            Err(e) => {
                log::warn!("Secondary memo read of {} failed: {}", name, e);
                Ok(None)
            }
        }
    }

    async fn write_memo(&self, name: &str, text: &str) -> Result<()> {
        self.cache.write_memo(name, text).await?;
        if let Err(e) = self.secondary.write_memo(name, text).await {
            log::warn!("Secondary memo write of {} failed, kept in cache: {}", name, e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Todo;
    use crate::error::Error;
    use crate::store::MemoryStorage;

    /// A secondary that refuses everything.
    struct Offline;

    #[async_trait]
    impl StorageBackend for Offline {
        async fn read_date_file(&self, date: NaiveDate) -> Result<Option<String>> {
            Err(Error::Read { date, source: std::io::ErrorKind::ConnectionRefused.into() })
        }
        async fn write_date_file(&self, date: NaiveDate, _text: &str) -> Result<()> {
            Err(Error::Write { date, source: std::io::ErrorKind::ConnectionRefused.into() })
        }
        async fn list_dates(&self) -> Result<Vec<NaiveDate>> {
            Err(Error::Config("offline".into()))
        }
        async fn read_memo(&self, _name: &str) -> Result<Option<String>> {
            Err(Error::Config("offline".into()))
        }
        async fn write_memo(&self, _name: &str, _text: &str) -> Result<()> {
            Err(Error::Config("offline".into()))
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
    }

    #[tokio::test]
    async fn secondary_hit_fills_cache() {
        let secondary = MemoryStorage::new();
        secondary.insert(date(1), "- [ ] a\n").await;
        let storage = CachedStorage::new(MemoryStorage::new(), secondary);

        assert_eq!(storage.read_date_file(date(1)).await.unwrap().as_deref(), Some("- [ ] a\n"));
        assert_eq!(
            storage.cache().read_date_file(date(1)).await.unwrap().as_deref(),
            Some("- [ ] a\n")
        );
    }

    #[tokio::test]
    async fn offline_secondary_fails_uncached_reads_only() {
        let storage = CachedStorage::new(MemoryStorage::new(), Offline);
        storage.write_date_file(date(2), "- [ ] b\n").await.unwrap();
        assert_eq!(storage.read_date_file(date(2)).await.unwrap().as_deref(), Some("- [ ] b\n"));
        assert!(matches!(storage.read_date_file(date(3)).await, Err(Error::Read { .. })));
        assert_eq!(storage.list_dates().await.unwrap(), vec![date(2)]);
    }

    /// Holds files but can't read them back; writes go through.
    #[derive(Default)]
    struct WriteOnly {
        inner: MemoryStorage,
    }

    #[async_trait]
    impl StorageBackend for WriteOnly {
        async fn read_date_file(&self, date: NaiveDate) -> Result<Option<String>> {
            Err(Error::Read { date, source: std::io::ErrorKind::TimedOut.into() })
        }
        async fn write_date_file(&self, date: NaiveDate, text: &str) -> Result<()> {
            self.inner.write_date_file(date, text).await
        }
        async fn list_dates(&self) -> Result<Vec<NaiveDate>> {
            self.inner.list_dates().await
        }
        async fn read_memo(&self, name: &str) -> Result<Option<String>> {
            self.inner.read_memo(name).await
        }
        async fn write_memo(&self, name: &str, text: &str) -> Result<()> {
            self.inner.write_memo(name, text).await
        }
    }

    #[tokio::test]
    async fn unreadable_secondary_blocks_save() {
        let secondary = WriteOnly::default();
        secondary.inner.insert(date(4), "- [ ] a\n- [ ] b\n").await;
        let storage = CachedStorage::new(MemoryStorage::new(), secondary);

        let previous = vec![Todo::on("a", date(4))];
        let next = vec![Todo::on("a'", date(4))];
        let result = crate::agenda::save(&storage, date(4), &previous, &next).await;
        assert!(matches!(result, Err(Error::Read { .. })));

        let kept = storage.secondary().inner.read_date_file(date(4)).await.unwrap();
        assert_eq!(kept.as_deref(), Some("- [ ] a\n- [ ] b\n"));
        assert_eq!(storage.secondary().inner.write_count(date(4)).await, 0);
    }
}
