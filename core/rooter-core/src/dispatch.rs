//! Background execution of root walks.
//!
//! A walk lists directories and must not run on the caller's interactive
//! thread. [`Dispatcher::submit`] hands each walk to its own worker thread and
//! returns immediately with a [`RequestId`]. Every submitted walk delivers
//! exactly one [`Completion`] on the dispatcher's channel, which the caller
//! drains from its own thread with [`Dispatcher::try_recv`] or
//! [`Dispatcher::recv_timeout`].
//!
//! Walks never share state, so any number may be in flight. Completions can
//! arrive in any order; ids increase monotonically, so a caller that only
//! cares about its newest request can drop anything older.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::error::{Result, RootError};
use crate::pattern::Pattern;
use crate::walker::{resolve, RootMatch};

/// Identity of one submitted walk. Later submissions always get larger ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of one walk, delivered once per submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub id: RequestId,
    pub start_dir: PathBuf,
    pub outcome: Option<RootMatch>,
}

pub struct Dispatcher {
    next_id: AtomicU64,
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            next_id: AtomicU64::new(1),
            sender,
            receiver,
        }
    }

    /// Starts a walk from `start_dir` on a worker thread.
    ///
    /// Fails only if the worker cannot be spawned; that failure affects this
    /// request alone.
    pub fn submit(&self, start_dir: PathBuf, patterns: Arc<[Pattern]>) -> Result<RequestId> {
        let id = RequestId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let sender = self.sender.clone();

        thread::Builder::new()
            .name(format!("rooter-walk-{}", id.0))
            .spawn(move || {
                let outcome = resolve(&start_dir, &patterns);
                let completion = Completion {
                    id,
                    start_dir,
                    outcome,
                };
                if sender.send(completion).is_err() {
                    tracing::debug!(request_id = id.0, "Completion dropped; receiver gone");
                }
            })
            .map_err(RootError::Spawn)?;

        tracing::debug!(request_id = id.0, "Root walk submitted");
        Ok(id)
    }

    /// Returns a finished walk if one is waiting, without blocking.
    pub fn try_recv(&self) -> Option<Completion> {
        self.receiver.try_recv().ok()
    }

    /// Waits up to `timeout` for the next finished walk.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Completion> {
        match self.receiver.recv_timeout(timeout) {
            Ok(completion) => Some(completion),
            Err(RecvTimeoutError::Timeout) => None,
            // The dispatcher holds a sender, so the channel cannot disconnect.
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Returns every walk that has already finished.
    pub fn drain(&self) -> Vec<Completion> {
        self.receiver.try_iter().collect()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const WAIT: Duration = Duration::from_secs(10);

    fn patterns(list: &[&str]) -> Arc<[Pattern]> {
        list.iter().map(|p| Pattern::from(*p)).collect()
    }

    #[test]
    fn delivers_match_on_channel() {
        let tmp = TempDir::new().expect("Failed to create temp dir");
        fs::write(tmp.path().join("Cargo.toml"), "").expect("Failed to create file");
        let start = tmp.path().join("src");
        fs::create_dir(&start).expect("Failed to create dir");

        let dispatcher = Dispatcher::new();
        let id = dispatcher
            .submit(start.clone(), patterns(&["Cargo.toml"]))
            .expect("submit");

        let completion = dispatcher.recv_timeout(WAIT).expect("completion");
        assert_eq!(completion.id, id);
        assert_eq!(completion.start_dir, start);
        let root = completion.outcome.expect("root");
        assert_eq!(root.dir, tmp.path());
        assert_eq!(root.pattern.as_str(), "Cargo.toml");
    }

    #[test]
    fn delivers_not_found() {
        let tmp = TempDir::new().expect("Failed to create temp dir");
        let dispatcher = Dispatcher::new();
        dispatcher
            .submit(tmp.path().to_path_buf(), patterns(&[]))
            .expect("submit");

        let completion = dispatcher.recv_timeout(WAIT).expect("completion");
        assert!(completion.outcome.is_none());
    }

    #[test]
    fn ids_increase_monotonically() {
        let tmp = TempDir::new().expect("Failed to create temp dir");
        let dispatcher = Dispatcher::new();
        let list = patterns(&[".git"]);

        let first = dispatcher
            .submit(tmp.path().to_path_buf(), Arc::clone(&list))
            .expect("submit");
        let second = dispatcher
            .submit(tmp.path().to_path_buf(), Arc::clone(&list))
            .expect("submit");

        assert!(second > first);
        assert_eq!(second.value(), first.value() + 1);
    }

    #[test]
    fn one_completion_per_submission() {
        let tmp = TempDir::new().expect("Failed to create temp dir");
        let dispatcher = Dispatcher::new();
        let list = patterns(&["=nothing-matches-this"]);

        let mut submitted: Vec<RequestId> = (0..8)
            .map(|_| {
                dispatcher
                    .submit(tmp.path().to_path_buf(), Arc::clone(&list))
                    .expect("submit")
            })
            .collect();

        let mut received: Vec<RequestId> = (0..8)
            .map(|_| dispatcher.recv_timeout(WAIT).expect("completion").id)
            .collect();

        submitted.sort();
        received.sort();
        assert_eq!(submitted, received);
        assert!(dispatcher.try_recv().is_none());
    }

    #[test]
    fn try_recv_is_empty_before_submission() {
        let dispatcher = Dispatcher::new();
        assert!(dispatcher.try_recv().is_none());
        assert!(dispatcher.drain().is_empty());
    }
}
