//! Background thread that owns the key-value store.
//!
//! The UI thread never touches storage directly. It sends commands over a
//! channel and picks up the outcomes on its next tick, so a slow or failing
//! disk never blocks input handling and no write result is lost.

use super::errors::{StorageError, StorageResult};
use super::persistence::KeyValueStore;
use crate::application::Persistence;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Debug)]
pub enum StorageCommand {
    Load,
    Save { seq: u64, snapshot: String },
    Shutdown,
}

#[derive(Debug)]
pub enum StorageEvent {
    /// Result of a `Load`; `Ok(None)` means nothing has been stored yet.
    Loaded(StorageResult<Option<String>>),
    /// Every snapshot up to and including `seq` is on disk.
    Saved { seq: u64 },
    SaveFailed { seq: u64, error: StorageError },
}

struct StorageWorker<S> {
    store: S,
    key: String,
    command_rx: Receiver<StorageCommand>,
    event_tx: Sender<StorageEvent>,
}

impl<S: KeyValueStore> StorageWorker<S> {
    fn run(mut self) {
        info!(key = %self.key, "storage worker started");
        let mut stashed: Option<StorageCommand> = None;

        loop {
            let command = match stashed.take() {
                Some(command) => command,
                None => match self.command_rx.recv() {
                    Ok(command) => command,
                    Err(_) => break,
                },
            };

            match command {
                StorageCommand::Load => {
                    let result = self.store.get(&self.key);
                    if let Err(e) = &result {
                        warn!(error = %e, "failed to read stored items");
                    }
                    self.emit(StorageEvent::Loaded(result));
                }
                StorageCommand::Save {
                    mut seq,
                    mut snapshot,
                } => {
                    // Only the newest snapshot of a queued burst is worth writing.
                    while let Ok(next) = self.command_rx.try_recv() {
                        match next {
                            StorageCommand::Save {
                                seq: newer_seq,
                                snapshot: newer,
                            } => {
                                debug!(skipped = seq, "coalescing queued save");
                                seq = newer_seq;
                                snapshot = newer;
                            }
                            other => {
                                stashed = Some(other);
                                break;
                            }
                        }
                    }
                    self.write(seq, &snapshot);
                }
                StorageCommand::Shutdown => break,
            }
        }

        info!("storage worker stopped");
    }

    fn write(&mut self, seq: u64, snapshot: &str) {
        match self.store.set(&self.key, snapshot) {
            Ok(()) => {
                debug!(seq, "snapshot saved");
                self.emit(StorageEvent::Saved { seq });
            }
            Err(error) => {
                error!(seq, error = %error, "failed to save snapshot");
                self.emit(StorageEvent::SaveFailed { seq, error });
            }
        }
    }

    fn emit(&self, event: StorageEvent) {
        // The UI side may already be gone during shutdown.
        let _ = self.event_tx.send(event);
    }
}

/// UI-side handle to the storage worker.
pub struct StorageHandle {
    command_tx: Sender<StorageCommand>,
    event_rx: Receiver<StorageEvent>,
    undelivered: Vec<StorageEvent>,
    next_seq: u64,
    thread: Option<JoinHandle<()>>,
}

impl StorageHandle {
    /// Starts a worker that reads and writes `key` in `store`.
    pub fn spawn<S>(store: S, key: &str) -> StorageResult<Self>
    where
        S: KeyValueStore + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let worker = StorageWorker {
            store,
            key: key.to_string(),
            command_rx,
            event_tx,
        };
        let thread = thread::Builder::new()
            .name("ttodo-storage".to_string())
            .spawn(move || worker.run())?;

        Ok(Self {
            command_tx,
            event_rx,
            undelivered: Vec::new(),
            next_seq: 0,
            thread: Some(thread),
        })
    }

    pub fn request_load(&mut self) {
        if self.command_tx.send(StorageCommand::Load).is_err() {
            error!("storage worker unavailable, cannot load items");
            self.undelivered
                .push(StorageEvent::Loaded(Err(StorageError::WorkerUnavailable)));
        }
    }

    /// Queues a snapshot for writing and returns its sequence number.
    pub fn submit(&mut self, snapshot: String) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        if self
            .command_tx
            .send(StorageCommand::Save { seq, snapshot })
            .is_err()
        {
            error!(seq, "storage worker unavailable, snapshot dropped");
            self.undelivered.push(StorageEvent::SaveFailed {
                seq,
                error: StorageError::WorkerUnavailable,
            });
        }
        seq
    }

    /// Sequence number of the most recently submitted snapshot (0 if none).
    pub fn last_submitted(&self) -> u64 {
        self.next_seq
    }

    /// Returns every event that has arrived since the last poll, without blocking.
    pub fn poll(&mut self) -> Vec<StorageEvent> {
        let mut events = std::mem::take(&mut self.undelivered);
        events.extend(self.event_rx.try_iter());
        events
    }

    /// Blocks for at most `timeout` waiting for the next event.
    pub fn wait_for_event(&mut self, timeout: Duration) -> Option<StorageEvent> {
        if !self.undelivered.is_empty() {
            return Some(self.undelivered.remove(0));
        }
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Lets the worker finish every queued command, then joins it.
    ///
    /// Returns the events that were still waiting to be polled.
    pub fn shutdown(&mut self) -> Vec<StorageEvent> {
        if let Some(thread) = self.thread.take() {
            let _ = self.command_tx.send(StorageCommand::Shutdown);
            if thread.join().is_err() {
                error!("storage worker panicked");
            }
        }
        self.poll()
    }
}

impl Persistence for StorageHandle {
    fn persist(&mut self, snapshot: String) {
        self.submit(snapshot);
    }
}

impl Drop for StorageHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{FileStore, MemoryStore, ITEMS_KEY};
    use tempfile::TempDir;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_load_missing_entry() {
        let mut handle = StorageHandle::spawn(MemoryStore::new(), ITEMS_KEY).unwrap();
        handle.request_load();
        match handle.wait_for_event(WAIT) {
            Some(StorageEvent::Loaded(Ok(None))) => {}
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_load_existing_entry() {
        let store = MemoryStore::with_entry(ITEMS_KEY, "[]");
        let mut handle = StorageHandle::spawn(store, ITEMS_KEY).unwrap();
        handle.request_load();
        match handle.wait_for_event(WAIT) {
            Some(StorageEvent::Loaded(Ok(Some(payload)))) => assert_eq!(payload, "[]"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_last_save_wins_after_shutdown() {
        let store = MemoryStore::new();
        let mut handle = StorageHandle::spawn(store.clone(), ITEMS_KEY).unwrap();

        for n in 1..=50 {
            handle.submit(format!("[{n}]"));
        }
        assert_eq!(handle.last_submitted(), 50);

        let events = handle.shutdown();
        assert_eq!(store.entry(ITEMS_KEY).as_deref(), Some("[50]"));
        assert!(store.write_count() >= 1);
        assert!(store.write_count() <= 50);

        let last_saved = events
            .iter()
            .filter_map(|event| match event {
                StorageEvent::Saved { seq } => Some(*seq),
                _ => None,
            })
            .max();
        assert_eq!(last_saved, Some(50));
    }

    #[test]
    fn test_failed_write_is_reported() {
        let store = MemoryStore::new();
        store.fail_writes(Some("disk full"));
        let mut handle = StorageHandle::spawn(store.clone(), ITEMS_KEY).unwrap();

        let seq = handle.submit("[]".to_string());
        match handle.wait_for_event(WAIT) {
            Some(StorageEvent::SaveFailed { seq: failed, error }) => {
                assert_eq!(failed, seq);
                assert!(matches!(error, StorageError::Simulated(_)));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(store.entry(ITEMS_KEY), None);
    }

    #[test]
    fn test_load_after_save_sees_saved_value() {
        let temp_dir = TempDir::new().unwrap();
        let mut handle = StorageHandle::spawn(FileStore::new(temp_dir.path()), ITEMS_KEY).unwrap();

        handle.submit(r#"[{"key":1,"text":"A","complete":false,"editing":false}]"#.to_string());
        handle.request_load();

        let mut loaded = None;
        while let Some(event) = handle.wait_for_event(WAIT) {
            if let StorageEvent::Loaded(result) = event {
                loaded = Some(result.unwrap());
                break;
            }
        }
        assert_eq!(
            loaded.flatten().as_deref(),
            Some(r#"[{"key":1,"text":"A","complete":false,"editing":false}]"#)
        );
    }

    #[test]
    fn test_submit_after_shutdown_is_reported() {
        let mut handle = StorageHandle::spawn(MemoryStore::new(), ITEMS_KEY).unwrap();
        handle.shutdown();

        let seq = handle.submit("[]".to_string());
        let events = handle.poll();
        assert!(matches!(
            events.as_slice(),
            [StorageEvent::SaveFailed { seq: s, error: StorageError::WorkerUnavailable }] if *s == seq
        ));
    }
}
