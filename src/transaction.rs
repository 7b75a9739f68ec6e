use std::collections::HashMap;

use thiserror::Error as ThisError;

use crate::frame::Frame;
use crate::version::VersionTracker;

/// Transaction errors carrying their Redis wire messages.
#[derive(Debug, ThisError, PartialEq)]
pub enum Error {
    #[error("ERR MULTI calls can not be nested")]
    NestedMulti,
    #[error("ERR EXEC without MULTI")]
    ExecWithoutMulti,
    #[error("ERR DISCARD without MULTI")]
    DiscardWithoutMulti,
    #[error("ERR WATCH inside MULTI is not allowed")]
    WatchInsideMulti,
}

/// A command captured verbatim while the connection is queueing.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedCommand {
    pub name: String,
    pub args: Vec<String>,
}

/// Per-connection MULTI/EXEC/DISCARD/WATCH state machine.
///
/// Owned exclusively by the connection task, so no internal locking is
/// needed; the shared piece is the [`VersionTracker`] consulted at WATCH and
/// EXEC time.
#[derive(Default)]
pub struct TransactionState {
    in_multi: bool,
    queue: Vec<QueuedCommand>,
    // key -> version observed at WATCH time
    watching: HashMap<String, u64>,
}

impl TransactionState {
    pub fn new() -> TransactionState {
        TransactionState::default()
    }

    pub fn in_multi(&self) -> bool {
        self.in_multi
    }

    /// MULTI: enters queueing mode with a fresh queue.
    pub fn begin(&mut self) -> Result<(), Error> {
        if self.in_multi {
            return Err(Error::NestedMulti);
        }
        self.in_multi = true;
        self.queue.clear();
        Ok(())
    }

    /// Appends a command for later execution.
    pub fn queue(&mut self, name: String, args: Vec<String>) {
        self.queue.push(QueuedCommand { name, args });
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// DISCARD: drops the queue and all watches.
    pub fn discard(&mut self) -> Result<(), Error> {
        if !self.in_multi {
            return Err(Error::DiscardWithoutMulti);
        }
        self.reset();
        Ok(())
    }

    /// WATCH: records the current version of each key. Watches accumulate
    /// across calls but are only legal outside MULTI.
    pub fn watch(
        &mut self,
        versions: &VersionTracker,
        keys: impl IntoIterator<Item = String>,
    ) -> Result<(), Error> {
        if self.in_multi {
            return Err(Error::WatchInsideMulti);
        }
        for key in keys {
            let version = versions.get(&key);
            self.watching.insert(key, version);
        }
        Ok(())
    }

    /// UNWATCH: forgets every watched key.
    pub fn unwatch(&mut self) {
        self.watching.clear();
    }

    /// EXEC: runs the queue through `executor` in order.
    ///
    /// Returns `None` when any watched key's version moved since WATCH (the
    /// caller responds with a null array). A failing individual command
    /// becomes an error frame in its slot without stopping the rest. Either
    /// way the queue and watch set are cleared.
    pub fn exec<F>(
        &mut self,
        versions: &VersionTracker,
        mut executor: F,
    ) -> Result<Option<Vec<Frame>>, Error>
    where
        F: FnMut(&str, &[String]) -> Frame,
    {
        if !self.in_multi {
            return Err(Error::ExecWithoutMulti);
        }

        let aborted = self
            .watching
            .iter()
            .any(|(key, watched)| versions.get(key) != *watched);

        if aborted {
            self.reset();
            return Ok(None);
        }

        let queue = std::mem::take(&mut self.queue);
        let results = queue
            .iter()
            .map(|command| executor(&command.name, &command.args))
            .collect();

        self.reset();
        Ok(Some(results))
    }

    fn reset(&mut self) {
        self.in_multi = false;
        self.queue.clear();
        self.watching.clear();
    }
}

/// True for the commands that always execute immediately, even while the
/// connection is queueing.
pub fn is_transaction_command(name: &str) -> bool {
    matches!(name, "multi" | "exec" | "discard" | "watch" | "unwatch")
}
