//! In-memory freshness cache for API responses
//!
//! Provides a `FreshnessCache` that keeps fetched values in memory together
//! with fetch and expiry timestamps. The cache is scoped to the session by
//! design: entries vanish when the process exits and are never persisted.

use std::collections::HashMap;

use chrono::{DateTime, Duration as ChronoDuration, Local, TimeZone, Utc};

/// How long a cached entry stays fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Fresh for a fixed duration after the fetch.
    Duration(std::time::Duration),
    /// Fresh until the end of the local calendar day of the fetch.
    ///
    /// Used for once-a-day resources like the astronomy picture of the day,
    /// where "today's" value stays valid until midnight regardless of when it
    /// was fetched.
    SameCalendarDay,
}

impl Ttl {
    /// Computes the expiry instant for a value fetched at `fetched_at`.
    fn expires_at(&self, fetched_at: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Ttl::Duration(d) => {
                let ttl = ChronoDuration::from_std(*d).unwrap_or(ChronoDuration::MAX);
                fetched_at.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)
            }
            Ttl::SameCalendarDay => {
                let local_day = fetched_at.with_timezone(&Local).date_naive();
                match local_day.succ_opt() {
                    Some(next_day) => {
                        let midnight = next_day.and_time(chrono::NaiveTime::MIN);
                        Local
                            .from_local_datetime(&midnight)
                            .earliest()
                            .map(|dt| dt.with_timezone(&Utc))
                            .unwrap_or(DateTime::<Utc>::MAX_UTC)
                    }
                    None => DateTime::<Utc>::MAX_UTC,
                }
            }
        }
    }
}

/// A single cached value with its timestamps
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    /// The cached data
    data: T,
    /// When the data was fetched
    fetched_at: DateTime<Utc>,
    /// When the entry stops being fresh
    expires_at: DateTime<Utc>,
}

/// Result of reading from the cache, including freshness metadata
#[derive(Debug, Clone)]
pub struct CachedData<T> {
    /// The cached data
    pub data: T,
    /// When the data was originally fetched
    pub fetched_at: DateTime<Utc>,
    /// Whether the entry has passed its TTL
    pub is_expired: bool,
}

/// In-memory store of cached values keyed by resource identifier
///
/// Expired entries are still returned (with `is_expired = true`) so callers
/// can keep showing last-known data while a refresh is failing. Each widget
/// owns its own cache; there is no process-wide shared store.
#[derive(Debug, Default)]
pub struct FreshnessCache<T> {
    entries: HashMap<String, CacheEntry<T>>,
}

impl<T: Clone> FreshnessCache<T> {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Stores a value under `key`, stamped with the current time
    ///
    /// # Arguments
    /// * `key` - Resource identifier (e.g., "iss-position")
    /// * `data` - The value to cache
    /// * `ttl` - How long the entry should be considered fresh
    pub fn write(&mut self, key: &str, data: T, ttl: Ttl) {
        let fetched_at = Utc::now();
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                data,
                fetched_at,
                expires_at: ttl.expires_at(fetched_at),
            },
        );
    }

    /// Reads the value stored under `key`
    ///
    /// Returns `None` if nothing was ever stored. Returns `Some(CachedData)`
    /// with `is_expired = true` when the entry exists but is past its TTL.
    pub fn read(&self, key: &str) -> Option<CachedData<T>> {
        let entry = self.entries.get(key)?;
        Some(CachedData {
            data: entry.data.clone(),
            fetched_at: entry.fetched_at,
            is_expired: Utc::now() > entry.expires_at,
        })
    }

    /// Reads the value under `key` only if it is still fresh
    pub fn read_fresh(&self, key: &str) -> Option<CachedData<T>> {
        self.read(key).filter(|cached| !cached.is_expired)
    }

    /// Removes every entry
    #[allow(dead_code)]
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn sample() -> TestData {
        TestData {
            name: "test".to_string(),
            value: 42,
        }
    }

    #[test]
    fn test_read_returns_none_for_missing_key() {
        let cache: FreshnessCache<TestData> = FreshnessCache::new();
        assert!(cache.read("nonexistent").is_none());
    }

    #[test]
    fn test_fresh_entry_is_not_expired() {
        let mut cache = FreshnessCache::new();
        cache.write("key", sample(), Ttl::Duration(Duration::from_secs(60)));

        let cached = cache.read("key").expect("entry should exist");
        assert_eq!(cached.data, sample());
        assert!(!cached.is_expired, "fresh entry should not be expired");
    }

    #[test]
    fn test_expired_entry_is_still_returned() {
        let mut cache = FreshnessCache::new();
        cache.write("key", sample(), Ttl::Duration(Duration::ZERO));

        // Small delay to get past the zero TTL
        thread::sleep(Duration::from_millis(5));

        let cached = cache.read("key").expect("expired entry should still exist");
        assert_eq!(cached.data, sample());
        assert!(cached.is_expired, "zero-TTL entry should be expired");
    }

    #[test]
    fn test_read_fresh_skips_expired_entries() {
        let mut cache = FreshnessCache::new();
        cache.write("key", sample(), Ttl::Duration(Duration::ZERO));
        thread::sleep(Duration::from_millis(5));

        assert!(cache.read_fresh("key").is_none());
        assert!(cache.read("key").is_some(), "read still sees the stale entry");
    }

    #[test]
    fn test_overwrite_replaces_data_and_timestamp() {
        let mut cache = FreshnessCache::new();
        cache.write("key", sample(), Ttl::Duration(Duration::from_secs(60)));
        let first = cache.read("key").unwrap();

        let second_data = TestData {
            name: "second".to_string(),
            value: 2,
        };
        cache.write("key", second_data.clone(), Ttl::Duration(Duration::from_secs(60)));
        let second = cache.read("key").unwrap();

        assert_eq!(second.data, second_data);
        assert!(second.fetched_at >= first.fetched_at);
    }

    #[test]
    fn test_fetched_at_timestamp_is_recorded() {
        let mut cache = FreshnessCache::new();

        let before = Utc::now();
        cache.write("key", sample(), Ttl::Duration(Duration::from_secs(60)));
        let after = Utc::now();

        let cached = cache.read("key").unwrap();
        assert!(cached.fetched_at >= before);
        assert!(cached.fetched_at <= after);
    }

    #[test]
    fn test_same_calendar_day_entry_is_fresh_today() {
        let mut cache = FreshnessCache::new();
        cache.write("apod", sample(), Ttl::SameCalendarDay);

        let cached = cache.read("apod").unwrap();
        // An entry written "now" is always within the current local day.
        assert!(!cached.is_expired);
    }

    #[test]
    fn test_calendar_day_expiry_lands_on_local_midnight() {
        let now = Utc::now();
        let expires = Ttl::SameCalendarDay.expires_at(now);

        let local_expiry = expires.with_timezone(&Local);
        assert_eq!(local_expiry.time(), chrono::NaiveTime::MIN);
        assert_eq!(
            local_expiry.date_naive(),
            now.with_timezone(&Local).date_naive().succ_opt().unwrap()
        );
    }

    #[test]
    fn test_clear_removes_all_entries() {
        let mut cache = FreshnessCache::new();
        cache.write("a", sample(), Ttl::Duration(Duration::from_secs(60)));
        cache.write("b", sample(), Ttl::Duration(Duration::from_secs(60)));

        cache.clear();

        assert!(cache.read("a").is_none());
        assert!(cache.read("b").is_none());
    }

    #[test]
    fn test_keys_are_independent() {
        let mut cache = FreshnessCache::new();
        cache.write("a", sample(), Ttl::Duration(Duration::ZERO));
        cache.write(
            "b",
            TestData {
                name: "other".to_string(),
                value: 7,
            },
            Ttl::Duration(Duration::from_secs(60)),
        );
        thread::sleep(Duration::from_millis(5));

        assert!(cache.read("a").unwrap().is_expired);
        assert!(!cache.read("b").unwrap().is_expired);
    }
}
