//! Rating service: the entry points the host calls, and the background work
//! they trigger.
//!
//! Every entry point is synchronous and returns immediately. Network and file
//! I/O only ever happens on spawned tasks, so a host calling from its game
//! thread is never blocked by a slow API or disk.

use chrono::Utc;
use dashmap::DashSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, trace, warn};

use crate::cache::{FetchGate, UserCache, UserRecord};
use crate::config::Config;
use crate::constants::timing;
use crate::display::{DisplaySink, coin_for_level};
use crate::error::AppError;
use crate::persistence::{DurableStore, WriteBack};
use crate::rating::RatingFetcher;

/// Handle to a running rating service. Cheap to clone.
#[derive(Clone)]
pub struct RatingService {
    inner: Arc<Inner>,
}

struct Inner {
    cache: UserCache,
    gate: FetchGate,
    fetcher: RatingFetcher,
    writeback: WriteBack,
    sink: Arc<dyn DisplaySink>,
    active: DashSet<u64>,
    ttl_hours: u64,
    gate_timeout: Duration,
    shutting_down: AtomicBool,
    shutdown_tx: watch::Sender<bool>,
    background: Mutex<Vec<JoinHandle<()>>>,
    runtime: Handle,
}

/// Releases a claimed fetch if the task ends without storing a result.
struct FetchClaim<'a> {
    cache: &'a UserCache,
    steam_id: u64,
    settled: bool,
}

impl FetchClaim<'_> {
    fn complete(mut self, rating: i32) {
        self.cache.complete_fetch(self.steam_id, rating, Utc::now());
        self.settled = true;
    }
}

impl Drop for FetchClaim<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.cache.abort_fetch(self.steam_id);
        }
    }
}

impl RatingService {
    /// Builds the service from configuration, loads the data file and starts
    /// the flush and display timers.
    ///
    /// Must be called from within a Tokio runtime. The entry points may later be
    /// called from any thread; background work is spawned onto that runtime.
    pub async fn start(config: &Config, sink: Arc<dyn DisplaySink>) -> Result<Self, AppError> {
        config.validate()?;

        let fetcher = RatingFetcher::from_config(config)?;
        let store = DurableStore::new(config.data_file());
        let (shutdown_tx, _) = watch::channel(false);

        let inner = Arc::new(Inner {
            cache: UserCache::new(config.default_status),
            gate: FetchGate::new(config.max_concurrent_requests),
            fetcher,
            writeback: WriteBack::new(store),
            sink,
            active: DashSet::new(),
            ttl_hours: config.cache_expiry_hours,
            gate_timeout: Duration::from_millis(timing::GATE_ACQUIRE_TIMEOUT_MS),
            shutting_down: AtomicBool::new(false),
            shutdown_tx,
            background: Mutex::new(Vec::new()),
            runtime: Handle::current(),
        });

        inner.writeback.load_into(&inner.cache).await;

        let flush_task = spawn_flush_loop(
            Arc::clone(&inner),
            Duration::from_secs(config.save_interval_seconds),
        );
        let display_task = spawn_display_loop(
            Arc::clone(&inner),
            Duration::from_secs(config.display_refresh_seconds),
        );
        inner.background_tasks().extend([flush_task, display_task]);

        info!(
            "Rating service started: {} cached players, {} fetch slots, data file {}",
            inner.cache.len(),
            inner.gate.capacity(),
            inner.writeback.store().path().display()
        );

        Ok(Self { inner })
    }

    /// A player became active (connected). Refreshes the rating if it is stale.
    ///
    /// Returns the handle of the submitted refresh, if one was submitted. The
    /// caller is free to drop it; the refresh runs regardless.
    pub fn on_user_active(&self, steam_id: u64) -> Option<JoinHandle<()>> {
        if self.is_shutting_down() {
            return None;
        }
        self.inner.active.insert(steam_id);

        let record = self.inner.cache.get_or_create(steam_id);
        self.refresh_if_needed(steam_id, &record)
    }

    /// A player left. Their record stays cached and is queued for saving.
    pub fn on_user_inactive(&self, steam_id: u64) {
        self.inner.active.remove(&steam_id);
        self.inner.writeback.mark_dirty(steam_id);
    }

    /// Flips whether the player's level is shown. Returns the new state.
    ///
    /// Turning the display on shows a cached level right away, or requests one
    /// if none is cached. Turning it off clears the display.
    pub fn toggle_display(&self, steam_id: u64) -> bool {
        let show = self.inner.cache.toggle_show(steam_id);
        let record = self.inner.cache.get_or_create(steam_id);

        if show {
            if record.rating > 0 {
                self.inner.sink.apply_display(steam_id, record.rating);
            } else if !self.is_shutting_down() {
                self.refresh_if_needed(steam_id, &record);
            }
        } else {
            self.inner.sink.clear_display(steam_id);
        }

        self.inner.writeback.mark_dirty(steam_id);
        show
    }

    /// Cached level, `0` if unknown.
    pub fn current_rating(&self, steam_id: u64) -> i32 {
        self.inner
            .cache
            .get(steam_id)
            .map(|record| record.rating)
            .unwrap_or(0)
    }

    /// True if the player wants their level shown and one is known.
    pub fn should_display(&self, steam_id: u64) -> bool {
        self.inner
            .cache
            .get(steam_id)
            .is_some_and(|record| record.show_rating && record.rating > 0)
    }

    /// Coin id the scoreboard should show for the player, `0` for none.
    pub fn display_coin(&self, steam_id: u64) -> u32 {
        if self.should_display(steam_id) {
            coin_for_level(self.current_rating(steam_id))
        } else {
            0
        }
    }

    /// Snapshot of a player's record.
    pub fn record(&self, steam_id: u64) -> Option<UserRecord> {
        self.inner.cache.get(steam_id)
    }

    /// Re-applies the display for every active player that should show a level.
    /// Returns how many players were updated.
    pub fn refresh_display(&self) -> usize {
        self.inner.refresh_display()
    }

    /// Flushes pending changes now instead of waiting for the timer.
    pub async fn flush(&self) -> Result<usize, AppError> {
        self.inner.writeback.flush(&self.inner.cache).await
    }

    pub fn pending_writes(&self) -> usize {
        self.inner.writeback.pending()
    }

    pub fn cached_players(&self) -> usize {
        self.inner.cache.len()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.inner.shutting_down.load(Ordering::Acquire)
    }

    /// Stops the timers, refuses new fetches and runs the final flush.
    ///
    /// Fetches already running are not cancelled; their results are discarded.
    /// Only the first call does anything; later calls return `Ok(0)`.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<usize, AppError> {
        if self.inner.shutting_down.swap(true, Ordering::AcqRel) {
            return Ok(0);
        }
        info!("Shutting down rating service");

        self.inner.shutdown_tx.send_replace(true);
        self.inner.gate.close();

        let tasks: Vec<_> = self.inner.background_tasks().drain(..).collect();
        for task in tasks {
            if let Err(e) = task.await {
                warn!("Background task ended abnormally: {e}");
            }
        }

        let saved = self.inner.writeback.flush(&self.inner.cache).await?;
        info!("Final save wrote {saved} players");
        Ok(saved)
    }

    fn refresh_if_needed(&self, steam_id: u64, record: &UserRecord) -> Option<JoinHandle<()>> {
        if !record.needs_refresh(self.inner.ttl_hours, Utc::now()) {
            trace!("Cached level for Steam ID {steam_id} is fresh");
            return None;
        }

        let inner = Arc::clone(&self.inner);
        Some(
            self.inner
                .runtime
                .spawn(async move { inner.refresh(steam_id).await }),
        )
    }
}

impl Inner {
    fn background_tasks(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.background
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fetches and stores the level for one player, if a slot and the per-player
    /// claim can both be obtained. Otherwise does nothing; the next trigger retries.
    #[instrument(skip(self))]
    async fn refresh(&self, steam_id: u64) {
        let Some(_permit) = self.gate.try_acquire(self.gate_timeout).await else {
            debug!("Skipping fetch for Steam ID {steam_id}: no free slot");
            return;
        };

        if !self.cache.try_begin_fetch(steam_id) {
            return;
        }
        let claim = FetchClaim {
            cache: &self.cache,
            steam_id,
            settled: false,
        };

        let rating = self.fetcher.fetch_rating(steam_id).await;

        if self.shutting_down.load(Ordering::Acquire) {
            debug!("Discarding level for Steam ID {steam_id}: shutting down");
            return;
        }

        claim.complete(rating);
        self.writeback.mark_dirty(steam_id);

        if rating > 0
            && self.active.contains(&steam_id)
            && self.cache.get(steam_id).is_some_and(|r| r.show_rating)
        {
            self.sink.apply_display(steam_id, rating);
        }
    }

    fn refresh_display(&self) -> usize {
        let active: Vec<u64> = self.active.iter().map(|id| *id).collect();
        let mut updated = 0;
        for steam_id in active {
            if let Some(record) = self.cache.get(steam_id)
                && record.show_rating
                && record.rating > 0
            {
                self.sink.apply_display(steam_id, record.rating);
                updated += 1;
            }
        }
        updated
    }
}

fn spawn_flush_loop(inner: Arc<Inner>, period: Duration) -> JoinHandle<()> {
    let mut shutdown_rx = inner.shutdown_tx.subscribe();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if inner.writeback.pending() > 0 {
                        // Errors are logged by the write-back and retried next tick.
                        let _ = inner.writeback.flush(&inner.cache).await;
                    }
                }
                _ = shutdown_rx.changed() => break,
            }
        }
        debug!("Flush timer stopped");
    })
}

fn spawn_display_loop(inner: Arc<Inner>, period: Duration) -> JoinHandle<()> {
    let mut shutdown_rx = inner.shutdown_tx.subscribe();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let updated = inner.refresh_display();
                    trace!("Display tick updated {updated} players");
                }
                _ = shutdown_rx.changed() => break,
            }
        }
        debug!("Display timer stopped");
    })
}
