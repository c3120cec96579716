//! Exam paper handed to renderers, with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{ExamSelection, Question};
use crate::store::QuestionStore;

/// A generated exam with resolved question content, in selection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamPaper {
    /// Id of the session entry this paper was logged under.
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Whether the pool had to be reset to produce this paper.
    pub reset_performed: bool,
    /// Topics represented, in order of first appearance.
    pub topics: Vec<String>,
    pub questions: Vec<Question>,
}

impl ExamPaper {
    /// Resolve the ids of `selection` against `store`.
    pub fn resolve(
        id: Uuid,
        selection: &ExamSelection,
        store: &QuestionStore,
        reset_performed: bool,
    ) -> Result<Self, StoreError> {
        let questions = selection
            .question_ids
            .iter()
            .map(|qid| store.get(qid).cloned())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id,
            generated_at: selection.generated_at,
            reset_performed,
            topics: selection.topics.clone(),
            questions,
        })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Return a copy with the question order shuffled.
    pub fn shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let mut paper = self.clone();
        paper.questions.shuffle(rng);
        paper
    }

    /// Save the paper as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize exam paper")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write exam paper to {}", path.display()))?;
        Ok(())
    }

    /// Load a paper from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read exam paper from {}", path.display()))?;
        let paper: ExamPaper =
            serde_json::from_str(&content).context("failed to parse exam paper JSON")?;
        Ok(paper)
    }
}
