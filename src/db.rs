use std::path::PathBuf;

use crate::persistence::Manager;
use crate::pubsub::PubSub;
use crate::store::{HashStore, ListStore, SetStore, StringStore};
use crate::version::VersionTracker;

/// Which store currently holds a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    String,
    List,
    Hash,
    Set,
}

impl Kind {
    /// The name the TYPE command reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::List => "list",
            Kind::Hash => "hash",
            Kind::Set => "set",
        }
    }
}

/// Shared server state: the four stores plus the cross-cutting subsystems.
///
/// Every field is a cheap clonable handle over shared innards; handlers
/// receive a `Db` by value. No lock is held across subsystem boundaries.
#[derive(Clone)]
pub struct Db {
    pub strings: StringStore,
    pub lists: ListStore,
    pub hashes: HashStore,
    pub sets: SetStore,
    pub bus: PubSub,
    pub versions: VersionTracker,
    pub persistence: Manager,
}

impl Db {
    pub fn new(snapshot_path: impl Into<PathBuf>) -> Db {
        let strings = StringStore::new();
        let lists = ListStore::new();
        let hashes = HashStore::new();
        let sets = SetStore::new();

        let persistence = Manager::new(
            snapshot_path,
            strings.clone(),
            lists.clone(),
            hashes.clone(),
            sets.clone(),
        );

        Db {
            strings,
            lists,
            hashes,
            sets,
            bus: PubSub::new(),
            versions: VersionTracker::new(),
            persistence,
        }
    }

    /// The store a key currently lives in, if any. At most one store holds
    /// a given key; handlers enforce that through [`Db::conflicts_with`]
    /// before every write.
    pub fn key_kind(&self, key: &str) -> Option<Kind> {
        if self.strings.contains(key) {
            Some(Kind::String)
        } else if self.lists.contains(key) {
            Some(Kind::List)
        } else if self.hashes.contains(key) {
            Some(Kind::Hash)
        } else if self.sets.contains(key) {
            Some(Kind::Set)
        } else {
            None
        }
    }

    /// True when `key` already exists under a kind other than `kind`, i.e.
    /// the operation must fail with a WRONGTYPE error.
    pub fn conflicts_with(&self, key: &str, kind: Kind) -> bool {
        self.key_kind(key).is_some_and(|held| held != kind)
    }

    /// Union of all stores' keys (strings contribute only live entries).
    pub fn all_keys(&self) -> Vec<String> {
        let mut keys = self.strings.keys();
        keys.extend(self.lists.keys());
        keys.extend(self.hashes.keys());
        keys.extend(self.sets.keys());
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Db {
        let dir = std::env::temp_dir().join("oxidis-db-test");
        Db::new(dir.join("dump.rdb"))
    }

    #[test]
    fn key_kind_reflects_the_owning_store() {
        let db = db();
        db.strings.set("s".to_string(), "v".to_string());
        db.lists.rpush("l".to_string(), vec!["a".to_string()]);
        db.hashes
            .hset("h".to_string(), vec![("f".to_string(), "v".to_string())]);
        db.sets.sadd("z".to_string(), vec!["m".to_string()]);

        assert_eq!(db.key_kind("s"), Some(Kind::String));
        assert_eq!(db.key_kind("l"), Some(Kind::List));
        assert_eq!(db.key_kind("h"), Some(Kind::Hash));
        assert_eq!(db.key_kind("z"), Some(Kind::Set));
        assert_eq!(db.key_kind("missing"), None);
    }

    #[test]
    fn conflicts_only_across_kinds() {
        let db = db();
        db.strings.set("s".to_string(), "v".to_string());

        assert!(db.conflicts_with("s", Kind::List));
        assert!(db.conflicts_with("s", Kind::Set));
        assert!(!db.conflicts_with("s", Kind::String));
        assert!(!db.conflicts_with("missing", Kind::List));
    }

    #[test]
    fn all_keys_spans_every_store() {
        let db = db();
        db.strings.set("s".to_string(), "v".to_string());
        db.lists.rpush("l".to_string(), vec!["a".to_string()]);

        let mut keys = db.all_keys();
        keys.sort();
        assert_eq!(keys, vec!["l".to_string(), "s".to_string()]);
    }
}
