use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe store of unique-member sets.
///
/// Sets are created implicitly on first SADD and destroyed when the last
/// member is removed.
#[derive(Clone, Default)]
pub struct SetStore {
    data: Arc<RwLock<HashMap<String, HashSet<String>>>>,
}

impl SetStore {
    pub fn new() -> SetStore {
        SetStore::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, HashSet<String>>> {
        self.data.read().unwrap()
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, HashSet<String>>> {
        self.data.write().unwrap()
    }

    /// Adds members; returns how many were not already present.
    pub fn sadd(&self, key: String, members: Vec<String>) -> usize {
        let mut data = self.write();
        let set = data.entry(key).or_default();

        let mut added = 0;
        for member in members {
            if set.insert(member) {
                added += 1;
            }
        }
        added
    }

    /// Removes members; returns how many actually existed. An emptied set is
    /// destroyed.
    pub fn srem(&self, key: &str, members: &[String]) -> usize {
        let mut data = self.write();
        let set = match data.get_mut(key) {
            Some(set) => set,
            None => return 0,
        };

        let mut removed = 0;
        for member in members {
            if set.remove(member) {
                removed += 1;
            }
        }

        if set.is_empty() {
            data.remove(key);
        }
        removed
    }

    /// An unordered copy of the members; empty for absent keys.
    pub fn smembers(&self, key: &str) -> Vec<String> {
        self.read()
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn sismember(&self, key: &str, member: &str) -> bool {
        self.read().get(key).is_some_and(|set| set.contains(member))
    }

    /// Cardinality; zero for absent keys.
    pub fn scard(&self, key: &str) -> usize {
        self.read().get(key).map_or(0, HashSet::len)
    }

    /// Intersection of every named set, computed under a single read guard
    /// so concurrent mutators cannot produce a torn result. Empty if the key
    /// list is empty or any key is absent.
    pub fn sinter(&self, keys: &[String]) -> Vec<String> {
        let data = self.read();

        if keys.is_empty() {
            return Vec::new();
        }

        let mut sets = Vec::with_capacity(keys.len());
        for key in keys {
            match data.get(key) {
                Some(set) => sets.push(set),
                None => return Vec::new(),
            }
        }

        // Scan the smallest set and keep members present everywhere else.
        let (smallest_index, smallest) = sets
            .iter()
            .enumerate()
            .min_by_key(|(_, set)| set.len())
            .expect("at least one set");

        smallest
            .iter()
            .filter(|member| {
                sets.iter()
                    .enumerate()
                    .all(|(i, set)| i == smallest_index || set.contains(*member))
            })
            .cloned()
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Members are exported as plain lists so the snapshot record stays
    /// value-typed.
    pub fn export(&self) -> HashMap<String, Vec<String>> {
        self.read()
            .iter()
            .map(|(key, set)| (key.clone(), set.iter().cloned().collect()))
            .collect()
    }

    pub fn import(&self, entries: HashMap<String, Vec<String>>) -> usize {
        let mut data = self.write();
        let mut restored = 0;
        for (key, members) in entries {
            if members.is_empty() {
                continue;
            }
            data.insert(key, members.into_iter().collect());
            restored += 1;
        }
        restored
    }
}
