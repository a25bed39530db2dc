//! robots.txt caching with expiry
//!
//! Entries are keyed by the robots.txt URL (scheme, host and port), and record
//! either a parsed policy or the fact that the site has no usable robots.txt.
//! Fetch failures are never stored here so the next check retries.

use crate::clock::Clock;
use crate::robots::RobotsPolicy;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A cached robots.txt lookup
#[derive(Debug, Clone)]
pub struct CachedRobots {
    /// Parsed rules, or `None` when the site has no robots.txt
    pub policy: Option<Arc<RobotsPolicy>>,

    /// When the robots.txt was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    /// Checks if the entry has outlived `ttl` at time `now`
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now) >= ttl
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.fetched_at
    }
}

/// Shared, time-bounded map of robots.txt lookups
pub struct RobotsCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, CachedRobots>>,
}

impl RobotsCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Current time according to the cache's clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Returns the fresh entry for `robots_url`, dropping it if expired
    pub fn get(&self, robots_url: &str) -> Option<CachedRobots> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        match entries.get(robots_url) {
            Some(entry) if !entry.is_stale(now, self.ttl) => Some(entry.clone()),
            Some(_) => {
                entries.remove(robots_url);
                None
            }
            None => None,
        }
    }

    /// Records a lookup result stamped with the current time
    pub fn insert(&self, robots_url: &str, policy: Option<Arc<RobotsPolicy>>) -> CachedRobots {
        let entry = CachedRobots {
            policy,
            fetched_at: self.clock.now(),
        };
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(robots_url.to_string(), entry.clone());
        entry
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    fn cache_with_clock() -> (RobotsCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        ));
        let cache = RobotsCache::new(Duration::hours(1), clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_fresh_entry_returned() {
        let (cache, clock) = cache_with_clock();
        cache.insert("https://a.test/robots.txt", None);

        clock.advance(Duration::minutes(59));
        let entry = cache.get("https://a.test/robots.txt").unwrap();
        assert!(entry.policy.is_none());
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let (cache, clock) = cache_with_clock();
        let policy = Arc::new(RobotsPolicy::parse("User-agent: *\nDisallow: /"));
        cache.insert("https://a.test/robots.txt", Some(policy));

        clock.advance(Duration::minutes(61));
        assert!(cache.get("https://a.test/robots.txt").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_entries_are_per_origin() {
        let (cache, _clock) = cache_with_clock();
        cache.insert("https://a.test/robots.txt", None);
        assert!(cache.get("https://b.test/robots.txt").is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_age() {
        let (cache, clock) = cache_with_clock();
        let entry = cache.insert("https://a.test/robots.txt", None);
        clock.advance(Duration::minutes(12));
        assert_eq!(entry.age(clock.now()), Duration::minutes(12));
    }
}
