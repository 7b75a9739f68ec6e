use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

/// How often the background sweeper scans for expired entries.
const SWEEP_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    // None means the entry never expires.
    expires_at: Option<SystemTime>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(at) => at <= SystemTime::now(),
            None => false,
        }
    }
}

/// Remaining lifetime of a key as observed at one instant.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyTtl {
    /// The key does not exist (or had already expired).
    Absent,
    /// The key exists and never expires.
    NoExpiry,
    /// The key exists and expires after this duration.
    Remaining(Duration),
}

/// Exported form of a string entry. The expiry is absolute, in seconds since
/// the Unix epoch, so a snapshot survives process restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringEntry {
    pub value: String,
    pub expires_at: Option<u64>,
}

/// Thread-safe string store with per-key optional expiry.
///
/// Expiry is enforced lazily on every read; a background sweeper additionally
/// reclaims entries nobody reads anymore. Clones share the same underlying
/// map.
#[derive(Clone)]
pub struct StringStore {
    data: Arc<RwLock<HashMap<String, Entry>>>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl StringStore {
    pub fn new() -> StringStore {
        let (shutdown, _) = watch::channel(false);
        StringStore {
            data: Arc::new(RwLock::new(HashMap::new())),
            shutdown: Arc::new(shutdown),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Entry>> {
        self.data.read().unwrap()
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Entry>> {
        self.data.write().unwrap()
    }

    /// Retrieves a value. An entry whose expiry has passed is removed and
    /// reported as absent.
    pub fn get(&self, key: &str) -> Option<String> {
        let expired = {
            let data = self.read();
            match data.get(key) {
                Some(entry) if entry.is_expired() => true,
                Some(entry) => return Some(entry.value.clone()),
                None => return None,
            }
        };

        if expired {
            self.delete(key);
        }
        None
    }

    /// Stores a value with no expiry, replacing any previous entry (and any
    /// previous expiry).
    pub fn set(&self, key: String, value: String) {
        self.write().insert(
            key,
            Entry {
                value,
                expires_at: None,
            },
        );
    }

    /// Stores a value that expires `ttl` from now.
    pub fn set_with_ttl(&self, key: String, value: String, ttl: Duration) {
        self.write().insert(
            key,
            Entry {
                value,
                expires_at: Some(SystemTime::now() + ttl),
            },
        );
    }

    /// Removes a key. Returns whether it existed at the moment of removal.
    pub fn delete(&self, key: &str) -> bool {
        self.write().remove(key).is_some()
    }

    /// Reports whether a non-expired entry exists, without cloning it.
    pub fn contains(&self, key: &str) -> bool {
        self.read().get(key).is_some_and(|entry| !entry.is_expired())
    }

    /// Remaining lifetime of a key. Expired entries are removed and reported
    /// absent.
    pub fn ttl(&self, key: &str) -> KeyTtl {
        let expired = {
            let data = self.read();
            match data.get(key) {
                None => return KeyTtl::Absent,
                Some(entry) if entry.is_expired() => true,
                Some(entry) => match entry.expires_at {
                    None => return KeyTtl::NoExpiry,
                    Some(at) => {
                        return match at.duration_since(SystemTime::now()) {
                            Ok(remaining) => KeyTtl::Remaining(remaining),
                            // Raced past the deadline between the checks.
                            Err(_) => KeyTtl::Absent,
                        };
                    }
                },
            }
        };

        if expired {
            self.delete(key);
        }
        KeyTtl::Absent
    }

    /// All non-expired keys at the moment of the call.
    pub fn keys(&self) -> Vec<String> {
        self.read()
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Copies out every live entry, recording expiry as absolute epoch
    /// seconds. Expired entries are omitted.
    pub fn export(&self) -> HashMap<String, StringEntry> {
        self.read()
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .map(|(key, entry)| {
                let expires_at = entry
                    .expires_at
                    .and_then(|at| at.duration_since(UNIX_EPOCH).ok())
                    .map(|since_epoch| since_epoch.as_secs());
                (
                    key.clone(),
                    StringEntry {
                        value: entry.value.clone(),
                        expires_at,
                    },
                )
            })
            .collect()
    }

    /// Installs entries from a snapshot. Entries whose recorded expiry is
    /// already in the past are skipped. Returns the number restored.
    pub fn import(&self, entries: HashMap<String, StringEntry>) -> usize {
        let now = SystemTime::now();
        let mut data = self.write();
        let mut restored = 0;

        for (key, entry) in entries {
            let expires_at = match entry.expires_at {
                Some(secs) => {
                    let at = UNIX_EPOCH + Duration::from_secs(secs);
                    if at <= now {
                        continue;
                    }
                    Some(at)
                }
                None => None,
            };

            data.insert(
                key,
                Entry {
                    value: entry.value,
                    expires_at,
                },
            );
            restored += 1;
        }

        restored
    }

    /// Spawns the background sweeper. Must be called from within a tokio
    /// runtime; the task ends when [`StringStore::close`] is called.
    pub fn start_sweeper(&self) {
        let data = Arc::clone(&self.data);
        let mut shutdown = self.shutdown.subscribe();

        tokio::spawn(async move {
            let mut tick = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        let mut data = data.write().unwrap();
                        let before = data.len();
                        data.retain(|_, entry| !entry.is_expired());
                        let swept = before - data.len();
                        if swept > 0 {
                            debug!(swept, "removed expired string entries");
                        }
                    }
                    _ = shutdown.changed() => return,
                }
            }
        });
    }

    /// Stops the sweeper. Safe to call more than once.
    pub fn close(&self) {
        let _ = self.shutdown.send(true);
    }

    #[cfg(test)]
    fn raw_len(&self) -> usize {
        self.read().len()
    }
}

impl Default for StringStore {
    fn default() -> Self {
        Self::new()
    }
}
