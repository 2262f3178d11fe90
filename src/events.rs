//! Progress and log events
//!
//! Backup and restore report what they are doing through [`BackupEvent`]s.
//! Every event renders as a human-readable line via `Display`; the host
//! decides whether and how to show them.

use crate::backup::RestoreStage;
use crate::sync::RwLockExt;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Type alias for an event listener
pub type EventCallback = Arc<dyn Fn(&BackupEvent) + Send + Sync>;

/// Number of `Adding:` lines collected per log update by default
pub const DEFAULT_BATCH_INTERVAL: usize = 30;

/// Something that happened during a backup or restore
#[derive(Debug, Clone, PartialEq)]
pub enum BackupEvent {
    /// A new archive is about to be written
    SnapshotStarted { archive: PathBuf },

    /// The source tree is being copied to the staging directory
    Staging { source: PathBuf },

    /// A file was added to the archive (path relative to the source root)
    FileAdded { path: PathBuf },

    /// The archive was finalized
    SnapshotFinished {
        archive: PathBuf,
        file_count: usize,
        elapsed: Duration,
    },

    /// The staging directory could not be removed
    StagingCleanupFailed { path: PathBuf, reason: String },

    /// The restore pipeline entered a new stage
    Stage(RestoreStage),

    /// The safety backup was not taken
    SafetyBackupSkipped { reason: String },

    /// The safety backup failed and the restore continued
    SafetyBackupFailed { reason: String },

    /// The source folder is being removed
    Deleting { path: PathBuf },

    /// Removing the source folder failed and the restore continued
    DeleteFailed { path: PathBuf, reason: String },

    /// The archive is being extracted
    Extracting { archive: PathBuf },

    /// The restore finished
    Restored {
        archive: PathBuf,
        elapsed: Duration,
    },
}

impl fmt::Display for BackupEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SnapshotStarted { archive } => {
                write!(f, "Creating backup: {}", archive.display())
            }
            Self::Staging { source } => {
                write!(f, "Making temporary copy of {}", source.display())
            }
            Self::FileAdded { path } => write!(f, "Adding: {}", path.display()),
            Self::SnapshotFinished {
                file_count,
                elapsed,
                ..
            } => write!(
                f,
                "Added {file_count} files. Time elapsed: {:.2} seconds",
                elapsed.as_secs_f64()
            ),
            Self::StagingCleanupFailed { path, reason } => write!(
                f,
                "Could not remove temporary copy {}: {reason}",
                path.display()
            ),
            Self::Stage(stage) => write!(f, "Restore stage: {stage}"),
            Self::SafetyBackupSkipped { reason } => {
                write!(f, "Skipping safety backup: {reason}")
            }
            Self::SafetyBackupFailed { reason } => {
                write!(f, "Safety backup failed, continuing: {reason}")
            }
            Self::Deleting { path } => {
                write!(f, "Deleting existing directory: {}", path.display())
            }
            Self::DeleteFailed { path, reason } => write!(
                f,
                "Error deleting existing directory {}: {reason}",
                path.display()
            ),
            Self::Extracting { archive } => {
                write!(f, "Restoring backup: {}", archive.display())
            }
            Self::Restored { elapsed, .. } => write!(
                f,
                "Backup restored. Time elapsed: {:.2} seconds",
                elapsed.as_secs_f64()
            ),
        }
    }
}

/// Fan-out of [`BackupEvent`]s to registered listeners
pub struct EventManager {
    listeners: RwLock<Vec<EventCallback>>,
}

impl EventManager {
    /// Create an event manager with no listeners
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Register a listener called for every event
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&BackupEvent) + Send + Sync + 'static,
    {
        self.listeners.write_recovered().push(Arc::new(callback));
    }

    /// Deliver an event to all listeners
    pub fn emit(&self, event: &BackupEvent) {
        // Clone the list so a listener may subscribe without deadlocking
        let listeners: Vec<EventCallback> = self.listeners.read_recovered().clone();
        for callback in &listeners {
            callback(event);
        }
    }

    /// Number of registered listeners
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.read_recovered().len()
    }

    /// Remove all listeners
    pub fn clear(&self) {
        self.listeners.write_recovered().clear();
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventManager")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Collects log lines and releases them in batches
///
/// Per-file events arrive far faster than a UI can redraw. Push each line
/// and display whatever [`push`](Self::push) hands back; call
/// [`flush`](Self::flush) at the end of an operation for the remainder.
///
/// ```rust
/// use savekeep::BatchedLog;
///
/// let mut batch = BatchedLog::new(2);
/// assert_eq!(batch.push("Adding: a"), None);
/// assert_eq!(batch.push("Adding: b").as_deref(), Some("Adding: a\nAdding: b"));
/// assert_eq!(batch.flush(), None);
/// ```
#[derive(Debug, Clone)]
pub struct BatchedLog {
    interval: usize,
    pending: Vec<String>,
}

impl BatchedLog {
    /// Create a batcher releasing every `interval` lines (at least 1)
    #[must_use]
    pub fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
            pending: Vec::new(),
        }
    }

    /// Queue a line; returns the joined batch once `interval` lines are queued
    pub fn push(&mut self, line: impl Into<String>) -> Option<String> {
        self.pending.push(line.into());
        if self.pending.len() >= self.interval {
            self.flush()
        } else {
            None
        }
    }

    /// Release any queued lines
    pub fn flush(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let batch = self.pending.join("\n");
        self.pending.clear();
        Some(batch)
    }

    /// Number of lines waiting for the next batch
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl Default for BatchedLog {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_INTERVAL)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_listeners_receive_events() {
        let events = EventManager::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        events.subscribe(move |_event| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        events.emit(&BackupEvent::FileAdded {
            path: PathBuf::from("saves/slot1.sav"),
        });
        events.emit(&BackupEvent::Stage(RestoreStage::Done));

        assert_eq!(counter.load(Ordering::SeqCst), 2);

        events.clear();
        events.emit(&BackupEvent::Stage(RestoreStage::Done));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_event_display() {
        let added = BackupEvent::FileAdded {
            path: PathBuf::from("slot1.sav"),
        };
        assert_eq!(added.to_string(), "Adding: slot1.sav");

        let restored = BackupEvent::Restored {
            archive: PathBuf::from("BACKUP_003.zip"),
            elapsed: Duration::from_millis(1500),
        };
        assert_eq!(
            restored.to_string(),
            "Backup restored. Time elapsed: 1.50 seconds"
        );
    }

    #[test]
    fn test_batched_log_releases_every_interval() {
        let mut batch = BatchedLog::default();
        let released: Vec<String> = (0..65)
            .filter_map(|i| batch.push(format!("Adding: file{i}")))
            .collect();

        assert_eq!(released.len(), 2);
        assert_eq!(released[0].lines().count(), DEFAULT_BATCH_INTERVAL);
        assert_eq!(batch.pending(), 5);
        assert_eq!(batch.flush().unwrap().lines().count(), 5);
        assert_eq!(batch.flush(), None);
    }
}
