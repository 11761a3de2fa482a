//! Concurrent in-memory store of player state

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, trace};

use super::record::{PersistedRecord, UserRecord};

/// Player state keyed by SteamID64.
///
/// Backed by a sharded `DashMap`, so callers working on different players never
/// contend on a single lock. Every method holds a shard guard only for the
/// duration of the method and returns owned snapshots.
#[derive(Debug)]
pub struct UserCache {
    records: DashMap<u64, UserRecord>,
    default_show: bool,
}

impl UserCache {
    pub fn new(default_show: bool) -> Self {
        Self {
            records: DashMap::new(),
            default_show,
        }
    }

    /// Returns the record for `steam_id`, inserting a default one if absent.
    ///
    /// Insertion goes through the entry API so concurrent callers for an unseen
    /// player all observe the same record.
    pub fn get_or_create(&self, steam_id: u64) -> UserRecord {
        self.records
            .entry(steam_id)
            .or_insert_with(|| {
                debug!("Creating player record for Steam ID {steam_id}");
                UserRecord::new(self.default_show)
            })
            .clone()
    }

    pub fn get(&self, steam_id: u64) -> Option<UserRecord> {
        self.records.get(&steam_id).map(|record| record.clone())
    }

    /// True if `record` has no rating or its rating is older than `ttl_hours`.
    pub fn is_stale(record: &UserRecord, ttl_hours: u64) -> bool {
        record.is_stale(ttl_hours, Utc::now())
    }

    /// Flips the display flag, creating the record first. Returns the new state.
    ///
    /// Does not mark the player dirty; the caller decides when to persist.
    pub fn toggle_show(&self, steam_id: u64) -> bool {
        let mut record = self
            .records
            .entry(steam_id)
            .or_insert_with(|| UserRecord::new(self.default_show));
        record.show_rating = !record.show_rating;
        record.show_rating
    }

    /// Claims the fetch for `steam_id`.
    ///
    /// The in-flight check and set happen under the entry's shard lock, so of
    /// any number of concurrent callers exactly one gets `true`. Returns `false`
    /// if the player is unknown or a fetch is already running.
    pub fn try_begin_fetch(&self, steam_id: u64) -> bool {
        match self.records.get_mut(&steam_id) {
            Some(mut record) if !record.in_flight => {
                record.in_flight = true;
                true
            }
            Some(_) => {
                trace!("Fetch already in flight for Steam ID {steam_id}");
                false
            }
            None => false,
        }
    }

    /// Stores a fetch result. Rating and timestamp are written together and the
    /// in-flight flag is released in the same mutation.
    pub fn complete_fetch(&self, steam_id: u64, rating: i32, fetched_at: DateTime<Utc>) {
        if let Some(mut record) = self.records.get_mut(&steam_id) {
            record.rating = rating;
            record.last_fetch = fetched_at;
            record.in_flight = false;
        }
    }

    /// Releases the in-flight flag without touching the cached rating.
    pub fn abort_fetch(&self, steam_id: u64) {
        if let Some(mut record) = self.records.get_mut(&steam_id) {
            record.in_flight = false;
        }
    }

    /// Snapshot of the persisted fields for `steam_id`.
    pub fn persisted(&self, steam_id: u64) -> Option<PersistedRecord> {
        self.records
            .get(&steam_id)
            .map(|record| record.to_persisted())
    }

    /// Inserts a record read from disk unless the player is already in memory.
    /// Returns whether it was inserted.
    pub fn insert_loaded(&self, steam_id: u64, persisted: PersistedRecord) -> bool {
        match self.records.entry(steam_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(UserRecord::from(persisted));
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const STEAM_ID: u64 = 76561198000000001;

    #[test]
    fn test_get_or_create_uses_defaults() {
        let cache = UserCache::new(true);
        let record = cache.get_or_create(STEAM_ID);

        assert!(record.show_rating);
        assert_eq!(record.rating, 0);
        assert_eq!(record.last_fetch, DateTime::<Utc>::UNIX_EPOCH);
        assert!(!record.in_flight);
        assert!(UserCache::is_stale(&record, 24));
    }

    #[test]
    fn test_get_or_create_keeps_existing_record() {
        let cache = UserCache::new(false);
        cache.get_or_create(STEAM_ID);
        cache.complete_fetch(STEAM_ID, 8, Utc::now());

        let record = cache.get_or_create(STEAM_ID);
        assert_eq!(record.rating, 8);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_get_or_create_creates_single_record() {
        let cache = Arc::new(UserCache::new(true));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    cache.get_or_create(STEAM_ID);
                    cache.try_begin_fetch(STEAM_ID)
                })
            })
            .collect();

        let claimed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|claimed| *claimed)
            .count();

        assert_eq!(cache.len(), 1);
        assert_eq!(claimed, 1, "exactly one caller may claim the fetch");
    }

    #[test]
    fn test_toggle_show_flips_and_creates() {
        let cache = UserCache::new(true);

        assert!(!cache.toggle_show(STEAM_ID));
        assert!(cache.toggle_show(STEAM_ID));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_fetch_claim_lifecycle() {
        let cache = UserCache::new(true);
        assert!(!cache.try_begin_fetch(STEAM_ID), "unknown players cannot be claimed");

        cache.get_or_create(STEAM_ID);
        assert!(cache.try_begin_fetch(STEAM_ID));
        assert!(!cache.try_begin_fetch(STEAM_ID));

        let fetched_at = Utc::now();
        cache.complete_fetch(STEAM_ID, 7, fetched_at);

        let record = cache.get(STEAM_ID).unwrap();
        assert_eq!(record.rating, 7);
        assert_eq!(record.last_fetch, fetched_at);
        assert!(!record.in_flight);
        assert!(!UserCache::is_stale(&record, 24));
        assert!(cache.try_begin_fetch(STEAM_ID));
    }

    #[test]
    fn test_abort_fetch_keeps_rating() {
        let cache = UserCache::new(true);
        cache.get_or_create(STEAM_ID);
        cache.complete_fetch(STEAM_ID, 3, Utc::now());

        assert!(cache.try_begin_fetch(STEAM_ID));
        cache.abort_fetch(STEAM_ID);

        let record = cache.get(STEAM_ID).unwrap();
        assert_eq!(record.rating, 3);
        assert!(!record.in_flight);
    }

    #[test]
    fn test_insert_loaded_does_not_overwrite_memory() {
        let cache = UserCache::new(true);
        cache.get_or_create(STEAM_ID);
        cache.complete_fetch(STEAM_ID, 5, Utc::now());

        let from_disk = PersistedRecord {
            show_rating: false,
            rating: 2,
            last_fetch: DateTime::<Utc>::UNIX_EPOCH,
        };
        assert!(!cache.insert_loaded(STEAM_ID, from_disk));
        assert!(cache.insert_loaded(STEAM_ID + 1, from_disk));

        assert_eq!(cache.get(STEAM_ID).unwrap().rating, 5);
        assert_eq!(cache.persisted(STEAM_ID + 1), Some(from_disk));
    }
}
