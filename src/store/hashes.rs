use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe store of field-value hashes.
///
/// Hashes are created implicitly on first HSET and destroyed when the last
/// field is removed.
#[derive(Clone, Default)]
pub struct HashStore {
    data: Arc<RwLock<HashMap<String, HashMap<String, String>>>>,
}

impl HashStore {
    pub fn new() -> HashStore {
        HashStore::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, HashMap<String, String>>> {
        self.data.read().unwrap()
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, HashMap<String, String>>> {
        self.data.write().unwrap()
    }

    /// Sets fields on the hash at `key`. Returns how many fields were newly
    /// created; overwriting an existing field does not count.
    pub fn hset(&self, key: String, field_values: Vec<(String, String)>) -> usize {
        let mut data = self.write();
        let hash = data.entry(key).or_default();

        let mut created = 0;
        for (field, value) in field_values {
            if hash.insert(field, value).is_none() {
                created += 1;
            }
        }
        created
    }

    pub fn hget(&self, key: &str, field: &str) -> Option<String> {
        self.read().get(key)?.get(field).cloned()
    }

    /// Removes fields; returns how many actually existed. An emptied hash is
    /// destroyed.
    pub fn hdel(&self, key: &str, fields: &[String]) -> usize {
        let mut data = self.write();
        let hash = match data.get_mut(key) {
            Some(hash) => hash,
            None => return 0,
        };

        let mut removed = 0;
        for field in fields {
            if hash.remove(field).is_some() {
                removed += 1;
            }
        }

        if hash.is_empty() {
            data.remove(key);
        }
        removed
    }

    /// A copy of the whole mapping; empty for absent keys.
    pub fn hgetall(&self, key: &str) -> HashMap<String, String> {
        self.read().get(key).cloned().unwrap_or_default()
    }

    /// Field names only; empty for absent keys.
    pub fn hkeys(&self, key: &str) -> Vec<String> {
        self.read()
            .get(key)
            .map(|hash| hash.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Field count; zero for absent keys.
    pub fn hlen(&self, key: &str) -> usize {
        self.read().get(key).map_or(0, HashMap::len)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub fn export(&self) -> HashMap<String, HashMap<String, String>> {
        self.read().clone()
    }

    pub fn import(&self, entries: HashMap<String, HashMap<String, String>>) -> usize {
        let mut data = self.write();
        let mut restored = 0;
        for (key, hash) in entries {
            if hash.is_empty() {
                continue;
            }
            data.insert(key, hash);
            restored += 1;
        }
        restored
    }
}
