use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use tokio::sync::oneshot;
use tracing::{debug, error};

use crate::store::strings::StringEntry;
use crate::store::{HashStore, ListStore, SetStore, StringStore};

const MAGIC: &[u8; 4] = b"OXDS";
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("background save already in progress")]
    SaveInProgress,
    #[error("no snapshot file found")]
    NoSnapshot,
    #[error("invalid snapshot format: {0}")]
    Format(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Point-in-time copy of all four stores, as written to disk (behind the
/// magic/version header). Expiry travels as absolute epoch seconds inside
/// [`StringEntry`].
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    strings: HashMap<String, StringEntry>,
    lists: HashMap<String, Vec<String>>,
    hashes: HashMap<String, HashMap<String, String>>,
    sets: HashMap<String, Vec<String>>,
}

/// How many keys of each type a [`Manager::load`] restored.
#[derive(Debug, Default, PartialEq)]
pub struct LoadResult {
    pub string_keys: usize,
    pub list_keys: usize,
    pub hash_keys: usize,
    pub set_keys: usize,
}

impl LoadResult {
    pub fn total_keys(&self) -> usize {
        self.string_keys + self.list_keys + self.hash_keys + self.set_keys
    }
}

#[derive(Default)]
struct SaveState {
    saving: bool,
    done: Option<oneshot::Receiver<Result<(), Error>>>,
}

/// Snapshot save/load coordinator.
///
/// Holds clones of the stores (cheap shared handles) and the target path.
/// At most one background save runs at a time; the gather happens before
/// `background_save` returns so callers know which state was captured.
#[derive(Clone)]
pub struct Manager {
    path: PathBuf,
    strings: StringStore,
    lists: ListStore,
    hashes: HashStore,
    sets: SetStore,
    state: Arc<Mutex<SaveState>>,
    // Serializes the temp-file-and-rename sequence between SAVE and a
    // concurrent background writer.
    write_lock: Arc<Mutex<()>>,
}

impl Manager {
    pub fn new(
        path: impl Into<PathBuf>,
        strings: StringStore,
        lists: ListStore,
        hashes: HashStore,
        sets: SetStore,
    ) -> Manager {
        Manager {
            path: path.into(),
            strings,
            lists,
            hashes,
            sets,
            state: Arc::new(Mutex::new(SaveState::default())),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Synchronously gathers and writes a snapshot.
    pub fn save(&self) -> Result<(), Error> {
        let snapshot = self.gather();
        let _guard = self.write_lock.lock().unwrap();
        write_snapshot(&self.path, &snapshot)
    }

    /// Starts a background save. The gather completes before this returns;
    /// only the encode-and-write happens asynchronously. Fails with
    /// [`Error::SaveInProgress`] while an earlier save is still writing.
    pub fn background_save(&self) -> Result<(), Error> {
        let (tx, rx) = oneshot::channel();

        {
            let mut state = self.state.lock().unwrap();
            if state.saving {
                return Err(Error::SaveInProgress);
            }
            state.saving = true;
            state.done = Some(rx);
        }

        let snapshot = self.gather();
        let manager = self.clone();

        tokio::spawn(async move {
            let result = {
                let _guard = manager.write_lock.lock().unwrap();
                write_snapshot(&manager.path, &snapshot)
            };

            if let Err(err) = &result {
                error!(?err, "background save failed");
            } else {
                debug!(path = %manager.path.display(), "background save finished");
            }

            manager.state.lock().unwrap().saving = false;
            let _ = tx.send(result);
        });

        Ok(())
    }

    /// Waits for the most recent background save and returns its outcome.
    /// Resolves immediately when no save was started.
    pub async fn wait_for_save(&self) -> Result<(), Error> {
        let done = self.state.lock().unwrap().done.take();
        match done {
            Some(rx) => rx.await.unwrap_or(Ok(())),
            None => Ok(()),
        }
    }

    pub fn is_saving(&self) -> bool {
        self.state.lock().unwrap().saving
    }

    /// Reads the snapshot file and imports every submap into its store.
    /// String entries whose expiry already passed are dropped by the import.
    pub fn load(&self) -> Result<LoadResult, Error> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NoSnapshot)
            }
            Err(err) => return Err(err.into()),
        };

        let snapshot = decode_snapshot(&bytes)?;

        Ok(LoadResult {
            string_keys: self.strings.import(snapshot.strings),
            list_keys: self.lists.import(snapshot.lists),
            hash_keys: self.hashes.import(snapshot.hashes),
            set_keys: self.sets.import(snapshot.sets),
        })
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Copies every store's contents under its own read lock. The result is
    /// consistent per store, not across stores.
    fn gather(&self) -> Snapshot {
        Snapshot {
            strings: self.strings.export(),
            lists: self.lists.export(),
            hashes: self.hashes.export(),
            sets: self.sets.export(),
        }
    }
}

/// Writes `MAGIC | version | bincode(snapshot)` to a temporary sibling file,
/// fsyncs it, and renames it into place so readers never observe a partial
/// snapshot. The temp file is removed on any failure.
fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), Error> {
    let body = bincode::serialize(snapshot).map_err(|err| Error::Format(err.to_string()))?;

    let mut tmp_path = path.as_os_str().to_owned();
    tmp_path.push(".tmp");
    let tmp_path = PathBuf::from(tmp_path);

    let result = (|| {
        let mut file = File::create(&tmp_path)?;
        file.write_all(MAGIC)?;
        file.write_all(&FORMAT_VERSION.to_le_bytes())?;
        file.write_all(&body)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp_path, path)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn decode_snapshot(bytes: &[u8]) -> Result<Snapshot, Error> {
    let header_len = MAGIC.len() + std::mem::size_of::<u32>();
    if bytes.len() < header_len || &bytes[..MAGIC.len()] != MAGIC {
        return Err(Error::Format("bad magic".to_string()));
    }

    let mut version_bytes = [0u8; 4];
    version_bytes.copy_from_slice(&bytes[MAGIC.len()..header_len]);
    let version = u32::from_le_bytes(version_bytes);
    if version != FORMAT_VERSION {
        return Err(Error::Format(format!("unsupported version {}", version)));
    }

    bincode::deserialize(&bytes[header_len..]).map_err(|err| Error::Format(err.to_string()))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempfile::tempdir;

    use super::*;

    struct Fixture {
        manager: Manager,
        strings: StringStore,
        lists: ListStore,
        hashes: HashStore,
        sets: SetStore,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let strings = StringStore::new();
        let lists = ListStore::new();
        let hashes = HashStore::new();
        let sets = SetStore::new();
        let manager = Manager::new(
            dir.path().join("dump.rdb"),
            strings.clone(),
            lists.clone(),
            hashes.clone(),
            sets.clone(),
        );
        Fixture {
            manager,
            strings,
            lists,
            hashes,
            sets,
            _dir: dir,
        }
    }

    fn populate(f: &Fixture) {
        f.strings.set("k1".to_string(), "v1".to_string());
        f.lists
            .rpush("L".to_string(), vec!["a".to_string(), "b".to_string()]);
        f.hashes
            .hset("H".to_string(), vec![("f".to_string(), "v".to_string())]);
        f.sets
            .sadd("S".to_string(), vec!["m1".to_string(), "m2".to_string()]);
    }

    #[test]
    fn save_then_load_restores_every_store() {
        let saved = fixture();
        populate(&saved);
        saved.manager.save().unwrap();
        assert!(saved.manager.exists());

        // Fresh stores pointed at the same file, as after a restart.
        let restored = Manager::new(
            saved.manager.path().to_path_buf(),
            StringStore::new(),
            ListStore::new(),
            HashStore::new(),
            SetStore::new(),
        );
        let result = restored.load().unwrap();

        assert_eq!(
            result,
            LoadResult {
                string_keys: 1,
                list_keys: 1,
                hash_keys: 1,
                set_keys: 1,
            }
        );
        assert_eq!(result.total_keys(), 4);

        assert_eq!(restored.strings.get("k1"), Some("v1".to_string()));
        assert_eq!(
            restored.lists.lrange("L", 0, -1),
            vec!["a".to_string(), "b".to_string()]
        );
        assert_eq!(restored.hashes.hget("H", "f"), Some("v".to_string()));
        assert!(restored.sets.sismember("S", "m1"));
        assert!(restored.sets.sismember("S", "m2"));
    }

    #[tokio::test]
    async fn expired_strings_never_survive_a_round_trip() {
        let f = fixture();
        f.strings.set("keep".to_string(), "v".to_string());
        f.strings
            .set_with_ttl("gone".to_string(), "v".to_string(), Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(30)).await;
        f.manager.save().unwrap();

        let restored = Manager::new(
            f.manager.path().to_path_buf(),
            StringStore::new(),
            ListStore::new(),
            HashStore::new(),
            SetStore::new(),
        );
        let result = restored.load().unwrap();

        assert_eq!(result.string_keys, 1);
        assert_eq!(restored.strings.get("keep"), Some("v".to_string()));
        assert_eq!(restored.strings.get("gone"), None);
    }

    #[test]
    fn load_missing_file_is_a_distinct_error() {
        let f = fixture();
        assert!(!f.manager.exists());
        assert!(matches!(f.manager.load(), Err(Error::NoSnapshot)));
    }

    #[test]
    fn load_rejects_foreign_bytes() {
        let f = fixture();
        fs::write(f.manager.path(), b"definitely not a snapshot").unwrap();

        assert!(matches!(f.manager.load(), Err(Error::Format(_))));
    }

    #[test]
    fn load_rejects_unknown_versions() {
        let f = fixture();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&99u32.to_le_bytes());
        fs::write(f.manager.path(), bytes).unwrap();

        assert!(matches!(f.manager.load(), Err(Error::Format(_))));
    }

    #[test]
    fn no_temp_file_left_behind_after_save() {
        let f = fixture();
        populate(&f);
        f.manager.save().unwrap();

        let mut tmp = f.manager.path().as_os_str().to_owned();
        tmp.push(".tmp");
        assert!(!PathBuf::from(tmp).exists());
    }

    // current_thread flavor: the spawned writer cannot run until this task
    // awaits, which makes the in-progress window deterministic.
    #[tokio::test]
    async fn background_save_is_single_flight() {
        let f = fixture();
        populate(&f);

        f.manager.background_save().unwrap();
        assert!(f.manager.is_saving());

        assert!(matches!(
            f.manager.background_save(),
            Err(Error::SaveInProgress)
        ));

        f.manager.wait_for_save().await.unwrap();
        assert!(!f.manager.is_saving());
        assert!(f.manager.exists());

        // A later save is allowed again.
        f.manager.background_save().unwrap();
        f.manager.wait_for_save().await.unwrap();
    }

    #[tokio::test]
    async fn background_save_captures_state_at_call_time() {
        let f = fixture();
        f.strings.set("k".to_string(), "before".to_string());

        f.manager.background_save().unwrap();
        // Mutate after the gather but before the writer task runs.
        f.strings.set("k".to_string(), "after".to_string());
        f.manager.wait_for_save().await.unwrap();

        let restored = Manager::new(
            f.manager.path().to_path_buf(),
            StringStore::new(),
            ListStore::new(),
            HashStore::new(),
            SetStore::new(),
        );
        restored.load().unwrap();

        assert_eq!(restored.strings.get("k"), Some("before".to_string()));
    }

    #[tokio::test]
    async fn wait_for_save_without_a_save_returns_immediately() {
        let f = fixture();
        f.manager.wait_for_save().await.unwrap();
    }
}
