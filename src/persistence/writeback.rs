//! Dirty tracking and batched flushes of player state

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, info, instrument, warn};

use super::store::DurableStore;
use crate::cache::UserCache;
use crate::constants::timing;
use crate::error::AppError;

/// Observable state of the write-back scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteBackState {
    Idle,
    Flushing,
}

/// Collects changed players and persists them in batches.
///
/// Each flush swaps out the dirty set, reloads the file, overwrites the entries
/// of the captured players and rewrites the whole document once. Players that
/// are on disk but not in memory are carried over untouched. The file lock
/// admits one flush or initial load at a time; the cache itself stays usable
/// throughout.
#[derive(Debug)]
pub struct WriteBack {
    store: DurableStore,
    dirty: Mutex<HashSet<u64>>,
    file_lock: AsyncMutex<()>,
    flushing: AtomicBool,
    lock_timeout: Duration,
}

impl WriteBack {
    pub fn new(store: DurableStore) -> Self {
        Self {
            store,
            dirty: Mutex::new(HashSet::new()),
            file_lock: AsyncMutex::new(()),
            flushing: AtomicBool::new(false),
            lock_timeout: Duration::from_millis(timing::FILE_LOCK_TIMEOUT_MS),
        }
    }

    /// Overrides how long a flush waits for the file lock.
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    pub fn store(&self) -> &DurableStore {
        &self.store
    }

    /// Queues `steam_id` for the next flush.
    pub fn mark_dirty(&self, steam_id: u64) {
        self.dirty_set().insert(steam_id);
    }

    /// Number of players waiting to be flushed.
    pub fn pending(&self) -> usize {
        self.dirty_set().len()
    }

    pub fn state(&self) -> WriteBackState {
        if self.flushing.load(Ordering::Acquire) {
            WriteBackState::Flushing
        } else {
            WriteBackState::Idle
        }
    }

    fn dirty_set(&self) -> std::sync::MutexGuard<'_, HashSet<u64>> {
        // The set holds plain ids, so a poisoned guard is still consistent.
        self.dirty.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn take_dirty(&self) -> HashSet<u64> {
        std::mem::take(&mut *self.dirty_set())
    }

    fn requeue(&self, ids: HashSet<u64>) {
        self.dirty_set().extend(ids);
    }

    /// Loads the data file into `cache` under the file lock.
    /// Players already in memory keep their in-memory state. Returns how many
    /// records were inserted.
    #[instrument(skip_all)]
    pub async fn load_into(&self, cache: &UserCache) -> usize {
        let _guard = self.file_lock.lock().await;
        let document = self.store.load_or_empty().await;
        let total = document.len();

        let inserted = document
            .into_iter()
            .filter(|(steam_id, persisted)| cache.insert_loaded(*steam_id, *persisted))
            .count();

        info!("Loaded {total} player records ({inserted} new)");
        inserted
    }

    /// Persists every dirty player still present in `cache`.
    ///
    /// Returns the number of players written, `0` if nothing was dirty. On
    /// failure the captured players are queued again so the next flush retries them.
    #[instrument(skip_all)]
    pub async fn flush(&self, cache: &UserCache) -> Result<usize, AppError> {
        let to_save = self.take_dirty();
        if to_save.is_empty() {
            return Ok(0);
        }

        let _guard = match tokio::time::timeout(self.lock_timeout, self.file_lock.lock()).await {
            Ok(guard) => guard,
            Err(_) => {
                warn!(
                    "Player data file busy, postponing save of {} players",
                    to_save.len()
                );
                self.requeue(to_save);
                return Err(AppError::file_lock_timeout(
                    self.store.path().display().to_string(),
                ));
            }
        };

        self.flushing.store(true, Ordering::Release);
        let result = self.merge_and_write(cache, &to_save).await;
        self.flushing.store(false, Ordering::Release);

        match result {
            Ok(written) => {
                debug!("Saved data for {written} players");
                Ok(written)
            }
            Err(e) => {
                error!("Error saving player data batch: {e}");
                self.requeue(to_save);
                Err(e)
            }
        }
    }

    async fn merge_and_write(
        &self,
        cache: &UserCache,
        to_save: &HashSet<u64>,
    ) -> Result<usize, AppError> {
        let mut document = self.store.load_or_empty().await;

        let mut written = 0;
        for steam_id in to_save {
            if let Some(persisted) = cache.persisted(*steam_id) {
                document.insert(*steam_id, persisted);
                written += 1;
            }
        }

        self.store.write(&document).await?;
        Ok(written)
    }
}
