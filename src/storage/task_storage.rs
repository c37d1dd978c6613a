use std::{
    future::Future,
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
};
use tracing::debug;

use super::entities::TaskDatabase;

pub const TASK_FILE_NAME: &str = "streaks.json";

/// Interface for abstracting storage of tasks.
pub trait TaskStorage {
    /// Reads every task. Storage that doesn't exist yet is an empty database.
    fn load(&self) -> impl Future<Output = Result<TaskDatabase>> + Send;

    /// Applies `change` to the stored tasks as one step: nothing else can modify them between
    /// the read and the write. Nothing is written when `change` fails or leaves the tasks as
    /// they were.
    fn update<T, F>(&self, change: F) -> impl Future<Output = Result<T>> + Send
    where
        T: Send,
        F: FnOnce(&mut TaskDatabase) -> Result<T> + Send;

    /// Replaces stored tasks with `database`.
    fn save(&self, database: &TaskDatabase) -> impl Future<Output = Result<()>> + Send
    where
        Self: Sync,
    {
        async move {
            self.update(|stored| {
                *stored = database.clone();
                Ok(())
            })
            .await
        }
    }
}

impl<T: Deref> TaskStorage for T
where
    T::Target: TaskStorage,
{
    fn load(&self) -> impl Future<Output = Result<TaskDatabase>> + Send {
        self.deref().load()
    }

    fn update<V, F>(&self, change: F) -> impl Future<Output = Result<V>> + Send
    where
        V: Send,
        F: FnOnce(&mut TaskDatabase) -> Result<V> + Send,
    {
        self.deref().update(change)
    }
}

/// The main realization of [TaskStorage]. Keeps everything in a single json file.
pub struct JsonTaskStorage {
    path: PathBuf,
}

impl JsonTaskStorage {
    /// Storage using [TASK_FILE_NAME] inside `dir`.
    pub fn new(dir: &Path) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(dir)?;

        Ok(Self {
            path: dir.join(TASK_FILE_NAME),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, content: &str) -> Result<TaskDatabase> {
        if content.trim().is_empty() {
            return Ok(TaskDatabase::default());
        }
        serde_json::from_str(content)
            .with_context(|| format!("Task file {:?} is corrupted", self.path))
    }

    async fn read_inner(path: &Path) -> Result<Option<String>, std::io::Error> {
        let mut file = match File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        file.lock_shared()?;
        let mut content = String::new();
        let result = file.read_to_string(&mut content).await;
        file.unlock()?;
        result?;
        Ok(Some(content))
    }

    /// Expects `file` to be locked exclusively.
    async fn update_locked<T, F>(&self, file: &mut File, change: F) -> Result<T>
    where
        F: FnOnce(&mut TaskDatabase) -> Result<T>,
    {
        let mut content = String::new();
        file.read_to_string(&mut content).await?;
        let stored = self.parse(&content)?;

        let mut database = stored.clone();
        let value = change(&mut database)?;
        if database == stored {
            debug!("No changes for {:?}", self.path);
            return Ok(value);
        }

        let mut content = serde_json::to_vec_pretty(&database)?;
        content.push(b'\n');
        file.set_len(0).await?;
        file.rewind().await?;
        file.write_all(&content).await?;
        file.flush().await?;
        file.sync_data().await?;
        Ok(value)
    }
}

impl TaskStorage for JsonTaskStorage {
    async fn load(&self) -> Result<TaskDatabase> {
        debug!("Loading tasks from {:?}", self.path);
        let content = Self::read_inner(&self.path)
            .await
            .with_context(|| format!("Failed to read {:?}", self.path))?;

        match content {
            Some(content) => self.parse(&content),
            None => Ok(TaskDatabase::default()),
        }
    }

    async fn update<T, F>(&self, change: F) -> Result<T>
    where
        T: Send,
        F: FnOnce(&mut TaskDatabase) -> Result<T> + Send,
    {
        debug!("Updating tasks in {:?}", self.path);
        let mut file = File::options()
            .write(true)
            .create(true)
            .read(true)
            .truncate(false)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open {:?}", self.path))?;

        // The lock spans read and write, so concurrent invocations apply their changes in turn.
        file.lock_exclusive()?;
        let result = self.update_locked(&mut file, change).await;
        file.unlock()?;
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, LazyLock};

    use anyhow::Result;
    use chrono::{NaiveDate, TimeZone, Utc};
    use tempfile::tempdir;

    use crate::{
        storage::{
            entities::TaskDatabase,
            task_storage::{JsonTaskStorage, TaskStorage},
        },
        utils::logging::TEST_LOGGING,
    };

    fn sample_database() -> Result<TaskDatabase> {
        let mut db = TaskDatabase::default();
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        db.add_task("Write code", created)?;
        db.add_task("Walk", created)?;
        db.mark_done("write code", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())?;
        db.mark_done("write code", NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())?;
        Ok(db)
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() -> Result<()> {
        LazyLock::force(&TEST_LOGGING);
        let dir = tempdir()?;
        let storage = JsonTaskStorage::new(dir.path())?;

        assert_eq!(storage.load().await?, TaskDatabase::default());
        assert!(!storage.path().exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_save_and_load() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonTaskStorage::new(dir.path())?;
        let db = sample_database()?;

        storage.save(&db).await?;
        assert_eq!(storage.load().await?, db);
        Ok(())
    }

    #[tokio::test]
    async fn test_save_overwrites_longer_content() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonTaskStorage::new(dir.path())?;

        storage.save(&sample_database()?).await?;
        let smaller = TaskDatabase::default();
        storage.save(&smaller).await?;

        assert_eq!(storage.load().await?, smaller);
        Ok(())
    }

    #[tokio::test]
    async fn test_creates_missing_directory() -> Result<()> {
        let dir = tempdir()?;
        let nested = dir.path().join("state").join("streaks");
        let storage = JsonTaskStorage::new(&nested)?;

        storage.save(&sample_database()?).await?;
        assert!(nested.join("streaks.json").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupted_file_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonTaskStorage::new(dir.path())?;
        std::fs::write(storage.path(), "{\"tasks\": {\"read\": ")?;

        let error = storage.load().await.unwrap_err();
        assert!(format!("{error:#}").contains("corrupted"));
        Ok(())
    }

    #[tokio::test]
    async fn test_storage_through_arc() -> Result<()> {
        let dir = tempdir()?;
        let storage = Arc::new(JsonTaskStorage::new(dir.path())?);
        let db = sample_database()?;

        storage.save(&db).await?;
        assert_eq!(storage.load().await?, db);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_change_writes_nothing() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonTaskStorage::new(dir.path())?;
        let db = sample_database()?;
        storage.save(&db).await?;

        let created = Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap();
        let result = storage
            .update::<(), _>(|stored| {
                stored.add_task("Read", created)?;
                anyhow::bail!("rejected")
            })
            .await;

        assert!(result.is_err());
        assert_eq!(storage.load().await?, db);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_all_kept() -> Result<()> {
        let dir = tempdir()?;
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let names = (0..8).map(|i| format!("Task {i}")).collect::<Vec<_>>();

        // Every writer gets its own file handle and runtime, like separate invocations would.
        std::thread::scope(|scope| {
            let handles = names
                .iter()
                .map(|name| {
                    let dir = dir.path();
                    scope.spawn(move || -> Result<()> {
                        let runtime = tokio::runtime::Builder::new_current_thread()
                            .enable_all()
                            .build()?;
                        let storage = JsonTaskStorage::new(dir)?;
                        runtime.block_on(storage.update(|db| {
                            db.add_task(name, created)?;
                            Ok(())
                        }))
                    })
                })
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .try_for_each(|handle| handle.join().expect("writer thread panicked"))
        })?;

        let db = JsonTaskStorage::new(dir.path())?.load().await?;
        assert_eq!(db.tasks().count(), names.len());
        for name in &names {
            assert!(db.get(name).is_ok(), "{name} was lost");
        }
        Ok(())
    }
}
