use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Monotonic per-key version counters backing WATCH.
///
/// Every handler mutation that changes an observable value bumps the key's
/// counter, deletions included; counters are never reset, so a WATCH taken
/// before a delete still observes a later re-creation. Reads never bump.
/// A key that was never written reads as version 0.
#[derive(Clone, Default)]
pub struct VersionTracker {
    versions: Arc<RwLock<HashMap<String, u64>>>,
}

impl VersionTracker {
    pub fn new() -> VersionTracker {
        VersionTracker::default()
    }

    pub fn get(&self, key: &str) -> u64 {
        self.versions.read().unwrap().get(key).copied().unwrap_or(0)
    }

    pub fn bump(&self, key: &str) {
        let mut versions = self.versions.write().unwrap();
        match versions.get_mut(key) {
            Some(version) => *version += 1,
            None => {
                versions.insert(key.to_string(), 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_reads_as_zero() {
        let tracker = VersionTracker::new();
        assert_eq!(tracker.get("k"), 0);
    }

    #[test]
    fn bump_is_monotonic_per_key() {
        let tracker = VersionTracker::new();

        tracker.bump("k");
        tracker.bump("k");
        tracker.bump("other");

        assert_eq!(tracker.get("k"), 2);
        assert_eq!(tracker.get("other"), 1);
    }

    #[test]
    fn clones_share_state() {
        let tracker = VersionTracker::new();
        let clone = tracker.clone();

        tracker.bump("k");
        assert_eq!(clone.get("k"), 1);
    }
}
