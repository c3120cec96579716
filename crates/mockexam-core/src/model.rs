//! Core data model types for mockexam.
//!
//! These are the types shared by the store, the selector, and the session
//! controller: question identity, question records, and selection results.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier of a question.
///
/// Derived from the source file and the position inside it, so reloading the
/// same bank yields the same ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build the id for the `position`-th (1-based) question of a source.
    pub fn from_source(source_stem: &str, position: usize) -> Self {
        Self(format!("{source_stem}_{position}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for QuestionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A question as produced by a loader, before any progress is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: QuestionId,
    /// Topic label, usually the source file stem.
    pub topic: String,
    /// Problem text. Opaque to the core.
    pub content: String,
    /// Solution text, empty when the source has none.
    #[serde(default)]
    pub solution: String,
}

impl QuestionRecord {
    pub fn new(
        id: impl Into<QuestionId>,
        topic: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
            content: content.into(),
            solution: String::new(),
        }
    }

    pub fn with_solution(mut self, solution: impl Into<String>) -> Self {
        self.solution = solution.into();
        self
    }
}

/// A question in the pool together with its progress state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub topic: String,
    pub content: String,
    #[serde(default)]
    pub solution: String,
    /// Whether the question has already been placed into an exam.
    pub solved: bool,
    /// When the question was last placed into an exam.
    pub last_seen: Option<DateTime<Utc>>,
}

impl From<QuestionRecord> for Question {
    fn from(record: QuestionRecord) -> Self {
        Self {
            id: record.id,
            topic: record.topic,
            content: record.content,
            solution: record.solution,
            solved: false,
            last_seen: None,
        }
    }
}

/// Pool-level counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    pub total: usize,
    pub solved: usize,
    pub unsolved: usize,
}

impl PoolStats {
    /// Fraction of the pool already used, in `0.0..=1.0`.
    pub fn solved_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.solved as f64 / self.total as f64
        }
    }

    /// Returns `true` when every question has been used.
    pub fn is_exhausted(&self) -> bool {
        self.total > 0 && self.unsolved == 0
    }
}

/// Per-topic counters, as reported by `QuestionStore::topic_stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicStats {
    pub topic: String,
    pub total: usize,
    pub unsolved: usize,
}

/// A request for one exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamRequest {
    /// Number of questions wanted.
    pub count: usize,
    /// Cap the exam at one question per topic.
    pub one_per_topic: bool,
}

impl ExamRequest {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            one_per_topic: false,
        }
    }

    pub fn one_per_topic(mut self, enabled: bool) -> Self {
        self.one_per_topic = enabled;
        self
    }
}

/// Ids chosen for one exam, in the order they were picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamSelection {
    pub question_ids: Vec<QuestionId>,
    /// Topics represented, in order of first appearance.
    pub topics: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl ExamSelection {
    pub fn len(&self) -> usize {
        self.question_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.question_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_from_source_is_stable() {
        let a = QuestionId::from_source("calculus", 3);
        let b = QuestionId::from_source("calculus", 3);
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "calculus_3");
        assert_eq!(a.to_string(), "calculus_3");
    }

    #[test]
    fn question_from_record_starts_unsolved() {
        let record = QuestionRecord::new("alg_1", "algebra", "Solve x").with_solution("x = 1");
        let q = Question::from(record);
        assert!(!q.solved);
        assert!(q.last_seen.is_none());
        assert_eq!(q.solution, "x = 1");
    }

    #[test]
    fn pool_stats_ratio_and_exhaustion() {
        let empty = PoolStats::default();
        assert_eq!(empty.solved_ratio(), 0.0);
        assert!(!empty.is_exhausted());

        let done = PoolStats {
            total: 4,
            solved: 4,
            unsolved: 0,
        };
        assert!(done.is_exhausted());
        assert_eq!(done.solved_ratio(), 1.0);
    }

    #[test]
    fn question_id_serializes_as_plain_string() {
        let id = QuestionId::new("geo_2");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"geo_2\"");
    }
}
