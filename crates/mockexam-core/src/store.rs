//! In-memory question pool.
//!
//! Questions are indexed by id and grouped by topic. Both indexes are ordered
//! maps so iteration order is stable, which keeps seeded selections
//! reproducible.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::model::{PoolStats, Question, QuestionId, QuestionRecord, TopicStats};

/// The full set of known questions with their solved state.
///
/// Invariant: every question id appears in exactly one topic group, and the
/// union of the topic groups is the whole pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionStore {
    questions: BTreeMap<QuestionId, Question>,
    topics: BTreeMap<String, BTreeSet<QuestionId>>,
}

impl QuestionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pool from loader output.
    pub fn from_records(
        records: impl IntoIterator<Item = QuestionRecord>,
    ) -> Result<Self, StoreError> {
        let mut store = Self::new();
        store.load(records)?;
        Ok(store)
    }

    /// Replace the pool with `records`.
    ///
    /// On error the current pool is left untouched.
    pub fn load(
        &mut self,
        records: impl IntoIterator<Item = QuestionRecord>,
    ) -> Result<(), StoreError> {
        let mut questions = BTreeMap::new();
        let mut topics: BTreeMap<String, BTreeSet<QuestionId>> = BTreeMap::new();

        for record in records {
            if record.id.as_str().trim().is_empty() {
                return Err(StoreError::EmptyId {
                    topic: record.topic,
                });
            }
            if record.topic.trim().is_empty() {
                return Err(StoreError::EmptyTopic(record.id));
            }
            if questions.contains_key(&record.id) {
                return Err(StoreError::DuplicateId(record.id));
            }
            topics
                .entry(record.topic.clone())
                .or_default()
                .insert(record.id.clone());
            questions.insert(record.id.clone(), Question::from(record));
        }

        tracing::debug!(
            "loaded {} questions across {} topics",
            questions.len(),
            topics.len()
        );
        self.questions = questions;
        self.topics = topics;
        Ok(())
    }

    pub fn get(&self, id: &QuestionId) -> Result<&Question, StoreError> {
        self.questions
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    pub fn contains(&self, id: &QuestionId) -> bool {
        self.questions.contains_key(id)
    }

    /// Mark a question as used in an exam at `timestamp`.
    pub fn mark_solved(
        &mut self,
        id: &QuestionId,
        timestamp: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let question = self
            .questions
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        question.solved = true;
        question.last_seen = Some(timestamp);
        Ok(())
    }

    /// Overwrite the progress fields of one question.
    pub(crate) fn restore_state(
        &mut self,
        id: &QuestionId,
        solved: bool,
        last_seen: Option<DateTime<Utc>>,
    ) -> bool {
        match self.questions.get_mut(id) {
            Some(question) => {
                question.solved = solved;
                question.last_seen = last_seen;
                true
            }
            None => false,
        }
    }

    pub fn unsolved(&self) -> BTreeSet<QuestionId> {
        self.ids_where(|q| !q.solved)
    }

    pub fn solved(&self) -> BTreeSet<QuestionId> {
        self.ids_where(|q| q.solved)
    }

    /// Ids in `topic`; empty when the topic is unknown.
    pub fn by_topic(&self, topic: &str) -> BTreeSet<QuestionId> {
        self.topics.get(topic).cloned().unwrap_or_default()
    }

    /// Unsolved ids grouped by topic, skipping topics with nothing left.
    pub fn unsolved_by_topic(&self) -> BTreeMap<&str, Vec<&QuestionId>> {
        let mut groups = BTreeMap::new();
        for (topic, ids) in &self.topics {
            let open: Vec<&QuestionId> = ids
                .iter()
                .filter(|id| self.questions.get(*id).is_some_and(|q| !q.solved))
                .collect();
            if !open.is_empty() {
                groups.insert(topic.as_str(), open);
            }
        }
        groups
    }

    /// Topic names in sorted order.
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.topics.keys().map(String::as_str)
    }

    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.questions.values()
    }

    /// Clear every solved flag and last-seen timestamp. Idempotent.
    pub fn reset_all(&mut self) {
        for question in self.questions.values_mut() {
            question.solved = false;
            question.last_seen = None;
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn stats(&self) -> PoolStats {
        let solved = self.questions.values().filter(|q| q.solved).count();
        PoolStats {
            total: self.questions.len(),
            solved,
            unsolved: self.questions.len() - solved,
        }
    }

    pub fn topic_stats(&self) -> Vec<TopicStats> {
        self.topics
            .iter()
            .map(|(topic, ids)| TopicStats {
                topic: topic.clone(),
                total: ids.len(),
                unsolved: ids
                    .iter()
                    .filter(|id| self.questions.get(*id).is_some_and(|q| !q.solved))
                    .count(),
            })
            .collect()
    }

    /// Returns `true` when the topic index covers the pool exactly once.
    pub fn is_consistent(&self) -> bool {
        let mut seen = HashSet::new();
        for (topic, ids) in &self.topics {
            for id in ids {
                let Some(question) = self.questions.get(id) else {
                    return false;
                };
                if &question.topic != topic || !seen.insert(id) {
                    return false;
                }
            }
        }
        seen.len() == self.questions.len()
    }

    fn ids_where(&self, pred: impl Fn(&Question) -> bool) -> BTreeSet<QuestionId> {
        self.questions
            .values()
            .filter(|q| pred(*q))
            .map(|q| q.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn sample_records() -> Vec<QuestionRecord> {
        vec![
            QuestionRecord::new("a", "topic1", "A"),
            QuestionRecord::new("b", "topic1", "B"),
            QuestionRecord::new("c", "topic2", "C"),
        ]
    }

    #[test]
    fn load_groups_by_topic() {
        let store = QuestionStore::from_records(sample_records()).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.by_topic("topic1").len(), 2);
        assert_eq!(store.by_topic("topic2").len(), 1);
        assert!(store.by_topic("missing").is_empty());
        assert_eq!(store.topics().collect::<Vec<_>>(), vec!["topic1", "topic2"]);
        assert!(store.is_consistent());
    }

    #[test]
    fn load_rejects_duplicate_ids() {
        let mut records = sample_records();
        records.push(QuestionRecord::new("a", "topic3", "again"));
        let err = QuestionStore::from_records(records).unwrap_err();
        assert_eq!(err, StoreError::DuplicateId(QuestionId::new("a")));
    }

    #[test]
    fn load_rejects_blank_topic() {
        let records = vec![QuestionRecord::new("x", "   ", "X")];
        let err = QuestionStore::from_records(records).unwrap_err();
        assert_eq!(err, StoreError::EmptyTopic(QuestionId::new("x")));
    }

    #[test]
    fn failed_load_keeps_previous_pool() {
        let mut store = QuestionStore::from_records(sample_records()).unwrap();
        let bad = vec![
            QuestionRecord::new("z", "t", "Z"),
            QuestionRecord::new("z", "t", "Z"),
        ];
        assert!(store.load(bad).is_err());
        assert_eq!(store.len(), 3);
        assert!(store.contains(&"a".into()));
    }

    #[test]
    fn get_unknown_id_is_not_found() {
        let store = QuestionStore::from_records(sample_records()).unwrap();
        assert!(matches!(
            store.get(&"nope".into()),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn mark_solved_updates_queries() {
        let mut store = QuestionStore::from_records(sample_records()).unwrap();
        store.mark_solved(&"b".into(), fixed_now()).unwrap();

        let q = store.get(&"b".into()).unwrap();
        assert!(q.solved);
        assert_eq!(q.last_seen, Some(fixed_now()));
        assert_eq!(store.solved().len(), 1);
        assert_eq!(store.unsolved().len(), 2);

        let stats = store.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.solved, 1);
        assert_eq!(stats.unsolved, 2);
    }

    #[test]
    fn mark_solved_unknown_id_fails() {
        let mut store = QuestionStore::from_records(sample_records()).unwrap();
        assert!(store.mark_solved(&"nope".into(), fixed_now()).is_err());
    }

    #[test]
    fn unsolved_by_topic_skips_exhausted_topics() {
        let mut store = QuestionStore::from_records(sample_records()).unwrap();
        store.mark_solved(&"c".into(), fixed_now()).unwrap();
        let groups = store.unsolved_by_topic();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups["topic1"].len(), 2);
    }

    #[test]
    fn reset_all_is_idempotent() {
        let mut store = QuestionStore::from_records(sample_records()).unwrap();
        for id in ["a", "b", "c"] {
            store.mark_solved(&id.into(), fixed_now()).unwrap();
        }
        assert!(store.stats().is_exhausted());

        store.reset_all();
        let once = store.clone();
        store.reset_all();
        assert_eq!(store, once);
        assert_eq!(store.unsolved().len(), 3);
        assert!(store.questions().all(|q| q.last_seen.is_none()));
    }

    #[test]
    fn topic_stats_counts_unsolved() {
        let mut store = QuestionStore::from_records(sample_records()).unwrap();
        store.mark_solved(&"a".into(), fixed_now()).unwrap();
        let stats = store.topic_stats();
        assert_eq!(stats[0].topic, "topic1");
        assert_eq!(stats[0].total, 2);
        assert_eq!(stats[0].unsolved, 1);
        assert_eq!(stats[1].unsolved, 1);
    }
}
