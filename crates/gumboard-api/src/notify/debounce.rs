use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// Key/last-hit store behind the notification debouncer.
///
/// The in-process [`MemoryDebounceStore`] is the default; a shared cache can
/// stand in for it when several server instances must debounce together.
pub trait DebounceStore: Send + Sync {
    /// Record a hit for `key` at `now`. Returns false when an earlier hit is
    /// younger than `window`; the earlier timestamp is kept in that case.
    fn check_and_record(&self, key: &str, now: Instant, window: Duration) -> bool;

    /// Drop entries older than `max_age`. Returns how many were dropped.
    fn prune(&self, now: Instant, max_age: Duration) -> usize;

    fn len(&self) -> usize;
}

/// Process-local store with a size cap. Exceeding the cap evicts the oldest
/// entries in one batch, down to the low-water mark (90% of the cap).
pub struct MemoryDebounceStore {
    entries: Mutex<HashMap<String, Instant>>,
    max_entries: usize,
    low_water: usize,
}

impl MemoryDebounceStore {
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries,
            low_water: max_entries - max_entries / 10,
        }
    }
}

/// Remove the oldest entries until `keep` remain. Selection is linear, not a
/// full sort.
fn evict_oldest(entries: &mut HashMap<String, Instant>, keep: usize) -> usize {
    if entries.len() <= keep {
        return 0;
    }
    let excess = entries.len() - keep;
    let mut ages: Vec<Instant> = entries.values().copied().collect();
    let (_, cutoff, _) = ages.select_nth_unstable(excess - 1);
    let cutoff = *cutoff;

    // Entries strictly older than the cutoff always go; ties fill the rest.
    let mut remaining = excess;
    entries.retain(|_, at| {
        if *at < cutoff {
            remaining -= 1;
            false
        } else {
            true
        }
    });
    entries.retain(|_, at| {
        if remaining > 0 && *at == cutoff {
            remaining -= 1;
            false
        } else {
            true
        }
    });
    excess
}

impl DebounceStore for MemoryDebounceStore {
    fn check_and_record(&self, key: &str, now: Instant, window: Duration) -> bool {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Debounce store lock poisoned; recovering");
                poisoned.into_inner()
            }
        };

        if let Some(last) = entries.get(key) {
            if now.saturating_duration_since(*last) < window {
                return false;
            }
        }

        entries.insert(key.to_string(), now);
        if entries.len() > self.max_entries {
            let evicted = evict_oldest(&mut entries, self.low_water);
            debug!("Debounce store over capacity; evicted {} oldest entries", evicted);
        }
        true
    }

    fn prune(&self, now: Instant, max_age: Duration) -> usize {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let before = entries.len();
        entries.retain(|_, at| now.saturating_duration_since(*at) <= max_age);
        let expired = before - entries.len();
        if entries.len() > self.max_entries {
            return expired + evict_oldest(&mut entries, self.low_water);
        }
        expired
    }

    fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }
}
