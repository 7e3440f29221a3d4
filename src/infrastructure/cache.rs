// Copyright 2025 Stratus Team.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Time-to-live key/value cache bounding the query rate against cloud APIs.
//!
//! Expiry is enforced at read time: a `get` past an entry's deadline is a
//! miss even if the sweeper has not run yet. The periodic sweep only bounds
//! memory for keys that are never read again.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};

use tracing::debug;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

struct Shard<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry<V>>>,
}

/// Concurrent TTL cache. Each sub-provider owns one instance, so keys from
/// different resource kinds can never collide and TTLs stay independently
/// tunable.
pub struct TtlCache<V> {
    inner: Arc<Shard<V>>,
    sweeper: Option<tokio::task::JoinHandle<()>>,
}

impl<V: Clone + Send + 'static> TtlCache<V> {
    /// Create a cache without a background sweeper. Reads still expire
    /// entries themselves; memory is only bounded by access pattern.
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Shard {
                ttl,
                entries: Mutex::new(HashMap::new()),
            }),
            sweeper: None,
        }
    }

    /// Create a cache with a sweeper task removing expired entries every
    /// `sweep_interval`. Must be called from within a tokio runtime. The
    /// task holds only a weak reference, so dropping the cache stops it.
    pub fn with_sweeper(ttl: Duration, sweep_interval: Duration) -> Self {
        let mut cache = Self::new(ttl);
        let weak: Weak<Shard<V>> = Arc::downgrade(&cache.inner);
        cache.sweeper = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await; // first tick fires immediately
            loop {
                ticker.tick().await;
                match weak.upgrade() {
                    Some(shard) => shard.sweep(),
                    None => break,
                }
            }
        }));
        cache
    }

    /// Look up a live entry. Expired entries are removed on the spot and
    /// reported as a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.inner.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert (or overwrite) a value with the cache-wide TTL.
    pub fn insert(&self, key: impl Into<String>, value: V) {
        let mut entries = self.inner.entries.lock().unwrap();
        entries.insert(
            key.into(),
            Entry {
                value,
                expires_at: Instant::now() + self.inner.ttl,
            },
        );
    }

    /// Remove all expired entries.
    pub fn sweep(&self) {
        self.inner.sweep();
    }

    /// Entry count, expired-but-unswept entries included.
    pub fn len(&self) -> usize {
        self.inner.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V> Shard<V> {
    fn sweep(&self) {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, remaining = entries.len(), "swept expired cache entries");
        }
    }
}

impl<V> Drop for TtlCache<V> {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.take() {
            handle.abort();
        }
    }
}
