use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe store of ordered string lists.
///
/// Lists are created implicitly on first push and destroyed the moment they
/// become empty, so an empty list is never observable.
#[derive(Clone, Default)]
pub struct ListStore {
    data: Arc<RwLock<HashMap<String, Vec<String>>>>,
}

impl ListStore {
    pub fn new() -> ListStore {
        ListStore::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Vec<String>>> {
        self.data.read().unwrap()
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Vec<String>>> {
        self.data.write().unwrap()
    }

    /// Prepends values in left-to-right argument order, so `LPUSH k a b c`
    /// on an empty key yields `[c, b, a]`. Returns the new length.
    pub fn lpush(&self, key: String, values: Vec<String>) -> usize {
        let mut data = self.write();
        let list = data.entry(key).or_default();
        for value in values {
            list.insert(0, value);
        }
        list.len()
    }

    /// Appends values in argument order. Returns the new length.
    pub fn rpush(&self, key: String, values: Vec<String>) -> usize {
        let mut data = self.write();
        let list = data.entry(key).or_default();
        list.extend(values);
        list.len()
    }

    pub fn lpop(&self, key: &str) -> Option<String> {
        let mut data = self.write();
        let list = data.get_mut(key)?;
        let value = if list.is_empty() {
            None
        } else {
            Some(list.remove(0))
        };
        if list.is_empty() {
            data.remove(key);
        }
        value
    }

    pub fn rpop(&self, key: &str) -> Option<String> {
        let mut data = self.write();
        let list = data.get_mut(key)?;
        let value = list.pop();
        if list.is_empty() {
            data.remove(key);
        }
        value
    }

    /// Inclusive range with negative indexing (`-1` is the last element).
    /// Out-of-bounds indices are clamped; an inverted range is empty. The
    /// result is a copy, unaffected by later mutation.
    pub fn lrange(&self, key: &str, start: i64, stop: i64) -> Vec<String> {
        let data = self.read();
        let list = match data.get(key) {
            Some(list) => list,
            None => return Vec::new(),
        };

        let length = list.len() as i64;

        let mut start = if start < 0 { length + start } else { start };
        let mut stop = if stop < 0 { length + stop } else { stop };

        if start < 0 {
            start = 0;
        }
        if stop >= length {
            stop = length - 1;
        }

        if start > stop || start >= length {
            return Vec::new();
        }

        list[start as usize..=stop as usize].to_vec()
    }

    /// List length; zero for absent keys.
    pub fn llen(&self, key: &str) -> usize {
        self.read().get(key).map_or(0, Vec::len)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub fn export(&self) -> HashMap<String, Vec<String>> {
        self.read().clone()
    }

    pub fn import(&self, entries: HashMap<String, Vec<String>>) -> usize {
        let mut data = self.write();
        let mut restored = 0;
        for (key, list) in entries {
            // Snapshots never contain empty lists, but importing one must not
            // create an observable empty key either.
            if list.is_empty() {
                continue;
            }
            data.insert(key, list);
            restored += 1;
        }
        restored
    }
}
