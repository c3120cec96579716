//! Durable progress: solved flags, last-seen timestamps, and session history.
//!
//! The `ProgressStore` trait is the seam between the session controller and
//! whatever keeps state across runs. `JsonProgressStore` writes a single JSON
//! document with write-to-temp-then-rename, so a reader never observes a
//! partially written file.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::error::ProgressError;
use crate::model::{ExamSelection, PoolStats, QuestionId};
use crate::store::QuestionStore;

/// Current on-disk format version.
pub const PROGRESS_FORMAT_VERSION: u32 = 1;

fn current_version() -> u32 {
    PROGRESS_FORMAT_VERSION
}

/// Progress of a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionProgress {
    pub solved: bool,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
}

/// One past exam generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub question_ids: Vec<QuestionId>,
    /// Whether the pool was reset to satisfy this session.
    #[serde(default)]
    pub reset_performed: bool,
}

impl SessionEntry {
    pub fn from_selection(selection: &ExamSelection, reset_performed: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            generated_at: selection.generated_at,
            question_ids: selection.question_ids.clone(),
            reset_performed,
        }
    }
}

/// What happens to the session log when progress is reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryPolicy {
    /// Keep past sessions; only solved flags are cleared.
    #[default]
    Preserve,
    /// Drop the session log together with the solved flags.
    Clear,
}

/// Durable snapshot of the pool's progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub totals: PoolStats,
    #[serde(default)]
    pub questions: BTreeMap<QuestionId, QuestionProgress>,
    #[serde(default)]
    pub history: Vec<SessionEntry>,
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            version: PROGRESS_FORMAT_VERSION,
            updated_at: None,
            totals: PoolStats::default(),
            questions: BTreeMap::new(),
            history: Vec::new(),
        }
    }
}

impl ProgressRecord {
    /// Snapshot the current pool state together with `history`.
    pub fn capture(store: &QuestionStore, history: Vec<SessionEntry>, now: DateTime<Utc>) -> Self {
        let questions = store
            .questions()
            .map(|q| {
                (
                    q.id.clone(),
                    QuestionProgress {
                        solved: q.solved,
                        last_seen: q.last_seen,
                    },
                )
            })
            .collect();

        Self {
            version: PROGRESS_FORMAT_VERSION,
            updated_at: Some(now),
            totals: store.stats(),
            questions,
            history,
        }
    }

    /// Restore this record onto `store`.
    ///
    /// Questions without an entry become unsolved. Entries for ids the pool no
    /// longer has are skipped; the number skipped is returned.
    pub fn apply_to(&self, store: &mut QuestionStore) -> usize {
        store.reset_all();
        let mut orphaned = 0;
        for (id, progress) in &self.questions {
            if !store.restore_state(id, progress.solved, progress.last_seen) {
                orphaned += 1;
            }
        }
        if orphaned > 0 {
            tracing::debug!("ignoring {orphaned} progress entries for questions no longer in the pool");
        }
        orphaned
    }

    /// Number of ids currently recorded as solved.
    pub fn solved_count(&self) -> usize {
        self.questions.values().filter(|p| p.solved).count()
    }
}

/// Durable storage for progress records.
pub trait ProgressStore: Send + Sync {
    /// Read the stored record; an empty record when nothing was stored yet.
    fn load(&self) -> Result<ProgressRecord, ProgressError>;

    /// Replace the stored record. Either the whole record becomes visible to
    /// the next `load` or none of it does.
    fn save(&self, record: &ProgressRecord) -> Result<(), ProgressError>;

    /// Remove stored state entirely.
    fn clear(&self) -> Result<(), ProgressError>;
}

/// Progress kept in a JSON file.
#[derive(Debug, Clone)]
pub struct JsonProgressStore {
    path: PathBuf,
}

impl JsonProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> ProgressError {
        ProgressError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn corrupt(&self, reason: impl Into<String>) -> ProgressError {
        ProgressError::CorruptState {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }
}

impl ProgressStore for JsonProgressStore {
    fn load(&self) -> Result<ProgressRecord, ProgressError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    "no progress file at {}, starting fresh",
                    self.path.display()
                );
                return Ok(ProgressRecord::default());
            }
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                return Err(self.corrupt(e.to_string()));
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let record: ProgressRecord =
            serde_json::from_str(&content).map_err(|e| self.corrupt(e.to_string()))?;

        if record.version > PROGRESS_FORMAT_VERSION {
            return Err(self.corrupt(format!(
                "unsupported format version {} (expected at most {})",
                record.version, PROGRESS_FORMAT_VERSION
            )));
        }

        tracing::info!(
            "loaded progress for {} questions ({} solved, {} past sessions)",
            record.questions.len(),
            record.solved_count(),
            record.history.len()
        );
        Ok(record)
    }

    fn save(&self, record: &ProgressRecord) -> Result<(), ProgressError> {
        let json = serde_json::to_string_pretty(record)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| self.io_error(e))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| self.io_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;

        tracing::debug!(
            "saved progress for {} questions to {}",
            record.questions.len(),
            self.path.display()
        );
        Ok(())
    }

    fn clear(&self) -> Result<(), ProgressError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// In-process progress store for tests and embedders.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    record: Mutex<Option<ProgressRecord>>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent saves fail (or succeed again).
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// The last successfully saved record.
    pub fn stored(&self) -> Option<ProgressRecord> {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&self) -> Result<ProgressRecord, ProgressError> {
        Ok(self.stored().unwrap_or_default())
    }

    fn save(&self, record: &ProgressRecord) -> Result<(), ProgressError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(ProgressError::Rejected("configured to fail".into()));
        }
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = Some(record.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&self) -> Result<(), ProgressError> {
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
