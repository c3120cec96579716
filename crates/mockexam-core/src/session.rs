//! Session controller: one exam generation from request to persisted result.
//!
//! A generation runs entirely under one lock, so two concurrent callers can
//! never both pick the same unsolved question. All state changes are made on
//! a working copy of the pool; the live pool is only replaced after the new
//! progress record has been saved.

use std::sync::{Mutex, MutexGuard};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{SelectError, SessionError};
use crate::model::{
    ExamRequest, ExamSelection, PoolStats, Question, QuestionId, QuestionRecord, TopicStats,
};
use crate::paper::ExamPaper;
use crate::progress::{HistoryPolicy, ProgressRecord, ProgressStore, SessionEntry};
use crate::selector;
use crate::store::QuestionStore;
use crate::time::Clock;

/// Policy knobs for the session controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// What an exhaustion reset does to the session log.
    #[serde(default)]
    pub history_on_reset: HistoryPolicy,
    /// Reset on any shortfall, not only when every question is solved.
    #[serde(default)]
    pub reset_on_shortfall: bool,
}

struct SessionState {
    pool: QuestionStore,
    history: Vec<SessionEntry>,
}

/// Steps of one generation cycle.
enum Step {
    Selecting { after_reset: bool },
    Resetting,
    Committing { selection: ExamSelection, after_reset: bool },
}

/// Owns the question pool and drives exam generation against a progress store.
pub struct SessionController<S: ProgressStore> {
    state: Mutex<SessionState>,
    progress: S,
    config: SessionConfig,
    clock: Clock,
}

impl<S: ProgressStore> SessionController<S> {
    /// Build the pool from `records` and restore persisted progress onto it.
    pub fn open(
        records: impl IntoIterator<Item = QuestionRecord>,
        progress: S,
        config: SessionConfig,
        clock: Clock,
    ) -> Result<Self, SessionError> {
        let mut pool = QuestionStore::from_records(records)?;
        let record = progress.load()?;
        let orphaned = record.apply_to(&mut pool);

        let stats = pool.stats();
        tracing::info!(
            "question pool ready: {} total, {} solved, {} unsolved ({} stale progress entries ignored)",
            stats.total,
            stats.solved,
            stats.unsolved,
            orphaned
        );

        Ok(Self {
            state: Mutex::new(SessionState {
                pool,
                history: record.history,
            }),
            progress,
            config,
            clock,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn progress_store(&self) -> &S {
        &self.progress
    }

    /// Generate one exam, mark its questions solved, and persist the result.
    ///
    /// When the selector reports a shortfall and the pool is exhausted (or
    /// `reset_on_shortfall` is set), the pool is reset and selection is retried
    /// once. If saving fails, the in-memory pool is left as it was.
    pub fn request_exam<R: Rng + ?Sized>(
        &self,
        request: &ExamRequest,
        rng: &mut R,
    ) -> Result<ExamPaper, SessionError> {
        let mut state = self.lock()?;
        let now = self.clock.now();

        let mut working = state.pool.clone();
        let mut history = state.history.clone();
        let mut step = Step::Selecting { after_reset: false };

        loop {
            step = match step {
                Step::Selecting { after_reset } => {
                    match selector::select(&working, request, now, rng) {
                        Ok(selection) => Step::Committing {
                            selection,
                            after_reset,
                        },
                        Err(e) if e.is_shortfall() && !after_reset && self.may_reset(&working) => {
                            Step::Resetting
                        }
                        Err(SelectError::InsufficientQuestions { requested, .. }) if after_reset => {
                            return Err(SessionError::NotEnoughQuestions {
                                requested,
                                pool_size: working.len(),
                            });
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                Step::Resetting => {
                    tracing::info!(
                        "resetting progress: {} of {} questions solved, history {:?}",
                        working.stats().solved,
                        working.len(),
                        self.config.history_on_reset
                    );
                    working.reset_all();
                    if self.config.history_on_reset == HistoryPolicy::Clear {
                        history.clear();
                    }
                    Step::Selecting { after_reset: true }
                }
                Step::Committing {
                    selection,
                    after_reset,
                } => {
                    for id in &selection.question_ids {
                        working.mark_solved(id, now)?;
                    }
                    let entry = SessionEntry::from_selection(&selection, after_reset);
                    let paper = ExamPaper::resolve(entry.id, &selection, &working, after_reset)?;
                    history.push(entry);

                    let record = ProgressRecord::capture(&working, history.clone(), now);
                    if let Err(e) = self.progress.save(&record) {
                        tracing::warn!("failed to persist exam session, discarding it: {e}");
                        return Err(e.into());
                    }

                    tracing::info!(
                        "generated exam {} with {} questions from {} topics",
                        paper.id,
                        paper.len(),
                        paper.topics.len()
                    );
                    state.pool = working;
                    state.history = history;
                    return Ok(paper);
                }
            };
        }
    }

    /// Clear all solved flags and persist, handling history per `policy`.
    pub fn reset_progress(&self, policy: HistoryPolicy) -> Result<PoolStats, SessionError> {
        let mut state = self.lock()?;
        let mut working = state.pool.clone();
        working.reset_all();
        let history = match policy {
            HistoryPolicy::Preserve => state.history.clone(),
            HistoryPolicy::Clear => Vec::new(),
        };

        let record = ProgressRecord::capture(&working, history.clone(), self.clock.now());
        self.progress.save(&record)?;

        tracing::info!("progress reset for {} questions", working.len());
        state.pool = working;
        state.history = history;
        Ok(state.pool.stats())
    }

    /// Delete the durable progress and start over with an empty history.
    pub fn discard_progress(&self) -> Result<PoolStats, SessionError> {
        let mut state = self.lock()?;
        self.progress.clear()?;

        tracing::info!("progress discarded for {} questions", state.pool.len());
        state.pool.reset_all();
        state.history.clear();
        Ok(state.pool.stats())
    }

    pub fn stats(&self) -> Result<PoolStats, SessionError> {
        Ok(self.lock()?.pool.stats())
    }

    pub fn topic_stats(&self) -> Result<Vec<TopicStats>, SessionError> {
        Ok(self.lock()?.pool.topic_stats())
    }

    pub fn topics(&self) -> Result<Vec<String>, SessionError> {
        Ok(self.lock()?.pool.topics().map(str::to_string).collect())
    }

    pub fn history(&self) -> Result<Vec<SessionEntry>, SessionError> {
        Ok(self.lock()?.history.clone())
    }

    pub fn question(&self, id: &QuestionId) -> Result<Question, SessionError> {
        Ok(self.lock()?.pool.get(id)?.clone())
    }

    /// Snapshot of the whole pool.
    pub fn pool(&self) -> Result<QuestionStore, SessionError> {
        Ok(self.lock()?.pool.clone())
    }

    fn may_reset(&self, pool: &QuestionStore) -> bool {
        pool.stats().is_exhausted() || (self.config.reset_on_shortfall && !pool.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, SessionState>, SessionError> {
        self.state.lock().map_err(|_| SessionError::Poisoned)
    }
}
