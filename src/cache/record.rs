//! Per-player cached state and its persisted form

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Cached state for one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Whether the overlay should show the level for this player.
    pub show_rating: bool,
    /// Cached skill level, `0` when unknown.
    pub rating: i32,
    /// When the last fetch completed, `UNIX_EPOCH` if never.
    pub last_fetch: DateTime<Utc>,
    /// Set while a fetch for this player is executing. Never persisted.
    pub in_flight: bool,
}

impl UserRecord {
    /// A record for a player seen for the first time.
    pub fn new(show_rating: bool) -> Self {
        Self {
            show_rating,
            rating: 0,
            last_fetch: DateTime::<Utc>::UNIX_EPOCH,
            in_flight: false,
        }
    }

    /// True if the rating is unknown or older than `ttl_hours` at `now`.
    pub fn is_stale(&self, ttl_hours: u64, now: DateTime<Utc>) -> bool {
        if self.rating == 0 {
            return true;
        }
        let ttl = i64::try_from(ttl_hours)
            .ok()
            .and_then(Duration::try_hours)
            .unwrap_or(Duration::MAX);
        now.signed_duration_since(self.last_fetch) > ttl
    }

    /// Stale and not already being fetched.
    pub fn needs_refresh(&self, ttl_hours: u64, now: DateTime<Utc>) -> bool {
        !self.in_flight && self.is_stale(ttl_hours, now)
    }

    pub fn to_persisted(&self) -> PersistedRecord {
        PersistedRecord {
            show_rating: self.show_rating,
            rating: self.rating,
            last_fetch: self.last_fetch,
        }
    }
}

impl From<PersistedRecord> for UserRecord {
    fn from(persisted: PersistedRecord) -> Self {
        Self {
            show_rating: persisted.show_rating,
            rating: persisted.rating,
            last_fetch: persisted.last_fetch,
            in_flight: false,
        }
    }
}

/// Fields of a [`UserRecord`] written to the data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecord {
    pub show_rating: bool,
    #[serde(default)]
    pub rating: i32,
    #[serde(default = "epoch")]
    pub last_fetch: DateTime<Utc>,
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_stale_regardless_of_last_fetch() {
        let now = Utc::now();
        let mut record = UserRecord::new(true);
        assert!(record.is_stale(24, now));

        record.last_fetch = now;
        assert!(record.is_stale(24, now), "rating 0 is always stale");
    }

    #[test]
    fn test_fresh_rating_is_not_stale_until_ttl() {
        let now = Utc::now();
        let record = UserRecord {
            rating: 7,
            last_fetch: now,
            ..UserRecord::new(true)
        };

        assert!(!record.is_stale(24, now));
        assert!(!record.is_stale(24, now + Duration::hours(24)));
        assert!(record.is_stale(24, now + Duration::hours(24) + Duration::seconds(1)));
    }

    #[test]
    fn test_in_flight_record_does_not_need_refresh() {
        let record = UserRecord {
            in_flight: true,
            ..UserRecord::new(true)
        };
        assert!(record.is_stale(24, Utc::now()));
        assert!(!record.needs_refresh(24, Utc::now()));
    }

    #[test]
    fn test_huge_ttl_does_not_panic() {
        let record = UserRecord {
            rating: 3,
            ..UserRecord::new(false)
        };
        assert!(!record.is_stale(u64::MAX, Utc::now()));
    }

    #[test]
    fn test_persisted_uses_camel_case() {
        let record = UserRecord {
            rating: 5,
            in_flight: true,
            ..UserRecord::new(true)
        };
        let json = serde_json::to_string(&record.to_persisted()).unwrap();

        assert!(json.contains("\"showRating\":true"));
        assert!(json.contains("\"rating\":5"));
        assert!(json.contains("\"lastFetch\":\"1970-01-01T00:00:00Z\""));
        assert!(!json.contains("inFlight"));
    }

    #[test]
    fn test_loaded_record_is_never_in_flight() {
        let persisted = PersistedRecord {
            show_rating: false,
            rating: 9,
            last_fetch: Utc::now(),
        };
        let record = UserRecord::from(persisted);
        assert!(!record.in_flight);
        assert_eq!(record.to_persisted(), persisted);
    }
}
