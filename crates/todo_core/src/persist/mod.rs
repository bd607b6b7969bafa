//! Write-through persistence with a configurable write policy.
//!
//! # Responsibility
//! - Apply slot writes and removals according to `WritePolicy`.
//! - Keep queued writes in issue order on one background writer.
//! - Record attempt/failure counters; never surface write failures.
//!
//! # Invariants
//! - Queued operations are applied in the order they were submitted.
//! - `read` observes every operation submitted before it.
//! - Dropping a `Persister` drains its queue before returning.

use crate::storage::{KeyValueStore, StorageResult};
use log::{debug, error, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const WRITER_THREAD_NAME: &str = "todo-persist";

/// Durability strategy for write-through persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Apply each write before the mutating call returns.
    Await,
    /// Queue each write on the background writer and return immediately.
    #[default]
    FireAndForget,
    /// Queue each write and retry failures on the background writer.
    Retry {
        /// Total attempts per write, including the first. Values below 1 act as 1.
        max_attempts: u32,
        backoff: Duration,
    },
}

impl WritePolicy {
    pub fn label(self) -> &'static str {
        match self {
            Self::Await => "await",
            Self::FireAndForget => "fire_and_forget",
            Self::Retry { .. } => "retry",
        }
    }

    fn is_queued(self) -> bool {
        !matches!(self, Self::Await)
    }

    fn attempts(self) -> u32 {
        match self {
            Self::Retry { max_attempts, .. } => max_attempts.max(1),
            Self::Await | Self::FireAndForget => 1,
        }
    }

    fn backoff(self) -> Duration {
        match self {
            Self::Retry { backoff, .. } => backoff,
            Self::Await | Self::FireAndForget => Duration::ZERO,
        }
    }
}

/// One persistence side effect of a store mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOp {
    /// Replace the slot with a full encoded snapshot.
    Write(Vec<u8>),
    /// Delete the slot.
    Remove,
}

impl PersistOp {
    fn label(&self) -> &'static str {
        match self {
            Self::Write(_) => "write",
            Self::Remove => "remove",
        }
    }
}

/// Snapshot of persistence counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PersistStats {
    /// Storage calls made, retries included.
    pub attempted: u64,
    /// Operations that still failed after their last attempt.
    pub failed: u64,
}

#[derive(Debug, Default)]
struct Counters {
    attempted: AtomicU64,
    failed: AtomicU64,
}

enum WriterMessage {
    Apply(PersistOp),
    Flush(Sender<()>),
}

struct Writer {
    tx: Sender<WriterMessage>,
    handle: JoinHandle<()>,
}

/// Applies persistence operations for one storage slot.
pub struct Persister {
    key: String,
    policy: WritePolicy,
    storage: Arc<dyn KeyValueStore>,
    counters: Arc<Counters>,
    writer: Option<Writer>,
}

impl Persister {
    /// Creates a persister, starting the background writer for queued policies.
    ///
    /// If the writer thread cannot be spawned, operations are applied inline.
    pub fn new(storage: Arc<dyn KeyValueStore>, key: impl Into<String>, policy: WritePolicy) -> Self {
        let key = key.into();
        let counters = Arc::new(Counters::default());
        let writer = if policy.is_queued() {
            spawn_writer(Arc::clone(&storage), key.clone(), policy, Arc::clone(&counters))
        } else {
            None
        };

        Self {
            key,
            policy,
            storage,
            counters,
            writer,
        }
    }

    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    pub fn policy(&self) -> WritePolicy {
        self.policy
    }

    /// Reads the slot after every previously submitted operation has run.
    pub fn read(&self) -> StorageResult<Option<Vec<u8>>> {
        self.flush();
        self.storage.read(&self.key)
    }

    /// Submits one operation according to the write policy.
    pub fn submit(&self, op: PersistOp) {
        if let Some(writer) = &self.writer {
            match writer.tx.send(WriterMessage::Apply(op)) {
                Ok(()) => return,
                Err(mpsc::SendError(message)) => {
                    warn!(
                        "event=persist_enqueue module=persist status=error error_code=writer_gone policy={}",
                        self.policy.label()
                    );
                    if let WriterMessage::Apply(op) = message {
                        apply_op(self.storage.as_ref(), &self.key, &op, self.policy, &self.counters);
                    }
                    return;
                }
            }
        }

        apply_op(self.storage.as_ref(), &self.key, &op, self.policy, &self.counters);
    }

    /// Blocks until every queued operation has been attempted.
    pub fn flush(&self) {
        let Some(writer) = &self.writer else {
            return;
        };
        let (done_tx, done_rx) = mpsc::channel();
        if writer.tx.send(WriterMessage::Flush(done_tx)).is_ok() {
            let _ = done_rx.recv();
        }
    }

    pub fn stats(&self) -> PersistStats {
        PersistStats {
            attempted: self.counters.attempted.load(Ordering::SeqCst),
            failed: self.counters.failed.load(Ordering::SeqCst),
        }
    }
}

impl Drop for Persister {
    fn drop(&mut self) {
        if let Some(Writer { tx, handle }) = self.writer.take() {
            drop(tx);
            if handle.join().is_err() {
                error!("event=persist_shutdown module=persist status=error error_code=writer_panicked");
            }
        }
    }
}

fn spawn_writer(
    storage: Arc<dyn KeyValueStore>,
    key: String,
    policy: WritePolicy,
    counters: Arc<Counters>,
) -> Option<Writer> {
    let (tx, rx) = mpsc::channel::<WriterMessage>();
    let spawned = thread::Builder::new()
        .name(WRITER_THREAD_NAME.to_string())
        .spawn(move || {
            for message in rx {
                match message {
                    WriterMessage::Apply(op) => {
                        apply_op(storage.as_ref(), &key, &op, policy, &counters);
                    }
                    WriterMessage::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
        });

    match spawned {
        Ok(handle) => Some(Writer { tx, handle }),
        Err(err) => {
            warn!(
                "event=persist_spawn module=persist status=error policy={} error={err}",
                policy.label()
            );
            None
        }
    }
}

fn apply_op(
    storage: &dyn KeyValueStore,
    key: &str,
    op: &PersistOp,
    policy: WritePolicy,
    counters: &Counters,
) {
    let attempts = policy.attempts();
    for attempt in 1..=attempts {
        counters.attempted.fetch_add(1, Ordering::SeqCst);
        let result = match op {
            PersistOp::Write(bytes) => storage.write(key, bytes),
            PersistOp::Remove => storage.remove(key),
        };

        match result {
            Ok(()) => {
                debug!(
                    "event=persist_apply module=persist status=ok op={} attempt={attempt} policy={}",
                    op.label(),
                    policy.label()
                );
                return;
            }
            Err(err) if attempt < attempts => {
                warn!(
                    "event=persist_apply module=persist status=retry op={} attempt={attempt} policy={} error={err}",
                    op.label(),
                    policy.label()
                );
                thread::sleep(policy.backoff());
            }
            Err(err) => {
                counters.failed.fetch_add(1, Ordering::SeqCst);
                error!(
                    "event=persist_apply module=persist status=error op={} attempt={attempt} policy={} error={err}",
                    op.label(),
                    policy.label()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PersistOp, Persister, WritePolicy};
    use crate::storage::{KeyValueStore, MemoryKeyValueStore};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn queued_writes_apply_in_submission_order() {
        let storage = Arc::new(MemoryKeyValueStore::new());
        let persister = Persister::new(storage.clone(), "slot", WritePolicy::FireAndForget);

        for index in 0..50 {
            persister.submit(PersistOp::Write(format!("v{index}").into_bytes()));
        }
        persister.flush();

        assert_eq!(storage.read("slot").unwrap(), Some(b"v49".to_vec()));
        assert_eq!(persister.stats().attempted, 50);
    }

    #[test]
    fn await_policy_writes_before_submit_returns() {
        let storage = Arc::new(MemoryKeyValueStore::new());
        let persister = Persister::new(storage.clone(), "slot", WritePolicy::Await);

        persister.submit(PersistOp::Write(b"now".to_vec()));
        assert_eq!(storage.read("slot").unwrap(), Some(b"now".to_vec()));

        persister.submit(PersistOp::Remove);
        assert!(!storage.contains("slot"));
    }

    #[test]
    fn retry_policy_counts_every_attempt_and_one_failure() {
        let storage = Arc::new(MemoryKeyValueStore::new());
        storage.set_offline(true);
        let policy = WritePolicy::Retry {
            max_attempts: 3,
            backoff: Duration::from_millis(1),
        };
        let persister = Persister::new(storage.clone(), "slot", policy);

        persister.submit(PersistOp::Write(b"lost".to_vec()));
        persister.flush();

        let stats = persister.stats();
        assert_eq!(stats.attempted, 3);
        assert_eq!(stats.failed, 1);
    }

    #[test]
    fn drop_drains_pending_writes() {
        let storage = Arc::new(MemoryKeyValueStore::new());
        {
            let persister = Persister::new(storage.clone(), "slot", WritePolicy::FireAndForget);
            persister.submit(PersistOp::Write(b"last".to_vec()));
        }
        assert_eq!(storage.read("slot").unwrap(), Some(b"last".to_vec()));
    }
}
