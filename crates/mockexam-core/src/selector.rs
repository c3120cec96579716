//! Topic-fair question selection.
//!
//! Selection is a pure function of the pool state, the request, and the
//! injected random source. It never mutates the pool.
//!
//! ## Strategy
//!
//! 1. Group unsolved ids by topic.
//! 2. Shuffle topic order, then shuffle the candidates inside each topic.
//! 3. Take one question per topic, in shuffled topic order, until the target
//!    is reached or every topic contributed once.
//! 4. Fill any remainder uniformly from the leftover unsolved questions of all
//!    topics pooled together.
//!
//! With `one_per_topic` the target is capped at the number of topics that
//! still have unsolved questions, so step 4 never runs.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::SelectError;
use crate::model::{ExamRequest, ExamSelection, QuestionId};
use crate::store::QuestionStore;

/// Pick questions for one exam.
///
/// Fails with [`SelectError::InsufficientQuestions`] when the pool cannot
/// provide the full target. Deciding whether to reset is up to the caller.
pub fn select<R: Rng + ?Sized>(
    store: &QuestionStore,
    request: &ExamRequest,
    generated_at: DateTime<Utc>,
    rng: &mut R,
) -> Result<ExamSelection, SelectError> {
    if request.count == 0 {
        return Err(SelectError::InvalidCount(request.count));
    }

    let groups = store.unsolved_by_topic();
    let available: usize = groups.values().map(Vec::len).sum();
    let wanted = if request.one_per_topic {
        request.count.min(groups.len())
    } else {
        request.count
    };

    if wanted == 0 || wanted > available {
        return Err(SelectError::InsufficientQuestions {
            requested: request.count,
            available,
        });
    }

    let mut groups: Vec<(&str, Vec<&QuestionId>)> = groups.into_iter().collect();
    groups.shuffle(rng);
    for (_, candidates) in &mut groups {
        candidates.shuffle(rng);
    }

    let mut question_ids = Vec::with_capacity(wanted);
    let mut topics: Vec<String> = Vec::new();
    let mut leftovers: Vec<(&str, &QuestionId)> = Vec::new();

    for (topic, candidates) in groups {
        let mut candidates = candidates.into_iter();
        if question_ids.len() < wanted {
            if let Some(first) = candidates.next() {
                question_ids.push(first.clone());
                topics.push(topic.to_string());
            }
        }
        leftovers.extend(candidates.map(|id| (topic, id)));
    }
    let per_topic = question_ids.len();

    if question_ids.len() < wanted {
        leftovers.shuffle(rng);
        let missing = wanted - question_ids.len();
        for (topic, id) in leftovers.into_iter().take(missing) {
            question_ids.push(id.clone());
            if !topics.iter().any(|t| t == topic) {
                topics.push(topic.to_string());
            }
        }
    }

    tracing::debug!(
        "selected {} questions ({} one-per-topic, {} random fill) from {} topics",
        question_ids.len(),
        per_topic,
        question_ids.len() - per_topic,
        topics.len()
    );

    Ok(ExamSelection {
        question_ids,
        topics,
        generated_at,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::model::QuestionRecord;
    use crate::time::fixed_now;

    fn three_question_pool() -> QuestionStore {
        QuestionStore::from_records(vec![
            QuestionRecord::new("A", "topic1", "A"),
            QuestionRecord::new("B", "topic1", "B"),
            QuestionRecord::new("C", "topic2", "C"),
        ])
        .unwrap()
    }

    fn wide_pool(topics: usize, per_topic: usize) -> QuestionStore {
        let mut records = Vec::new();
        for t in 0..topics {
            for q in 1..=per_topic {
                let topic = format!("topic{t}");
                records.push(QuestionRecord::new(
                    QuestionId::from_source(&topic, q),
                    topic.clone(),
                    format!("question {q} of {topic}"),
                ));
            }
        }
        QuestionStore::from_records(records).unwrap()
    }

    fn topic_of<'a>(store: &'a QuestionStore, id: &QuestionId) -> &'a str {
        &store.get(id).unwrap().topic
    }

    #[test]
    fn never_returns_duplicates() {
        let store = wide_pool(4, 5);
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            for count in 1..=20 {
                let request = ExamRequest::new(count);
                let selection = select(&store, &request, fixed_now(), &mut rng).unwrap();
                let unique: HashSet<_> = selection.question_ids.iter().collect();
                assert_eq!(unique.len(), selection.len(), "seed {seed} count {count}");
                assert_eq!(selection.len(), count);
            }
        }
    }

    #[test]
    fn covers_distinct_topics_when_count_fits() {
        let store = wide_pool(5, 3);
        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            let selection = select(&store, &ExamRequest::new(4), fixed_now(), &mut rng).unwrap();
            let topics: HashSet<_> = selection
                .question_ids
                .iter()
                .map(|id| topic_of(&store, id))
                .collect();
            assert_eq!(topics.len(), 4);
            assert_eq!(selection.topics.len(), 4);
        }
    }

    #[test]
    fn every_topic_represented_before_random_fill() {
        let store = wide_pool(3, 4);
        let mut rng = StdRng::seed_from_u64(7);
        let selection = select(&store, &ExamRequest::new(8), fixed_now(), &mut rng).unwrap();
        let first_three: HashSet<_> = selection.question_ids[..3]
            .iter()
            .map(|id| topic_of(&store, id))
            .collect();
        assert_eq!(first_three.len(), 3);
        assert_eq!(selection.len(), 8);
    }

    #[test]
    fn one_per_topic_truncates_to_topic_count() {
        let store = wide_pool(3, 4);
        let mut rng = StdRng::seed_from_u64(1);
        let request = ExamRequest::new(10).one_per_topic(true);
        let selection = select(&store, &request, fixed_now(), &mut rng).unwrap();
        assert_eq!(selection.len(), 3);
        let topics: HashSet<_> = selection
            .question_ids
            .iter()
            .map(|id| topic_of(&store, id))
            .collect();
        assert_eq!(topics.len(), 3);
    }

    #[test]
    fn one_per_topic_with_small_count() {
        let store = wide_pool(5, 2);
        let mut rng = StdRng::seed_from_u64(3);
        let request = ExamRequest::new(2).one_per_topic(true);
        let selection = select(&store, &request, fixed_now(), &mut rng).unwrap();
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn two_from_two_topics_scenario() {
        let store = three_question_pool();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let selection = select(&store, &ExamRequest::new(2), fixed_now(), &mut rng).unwrap();
            assert_eq!(selection.len(), 2);
            let topics: HashSet<_> = selection
                .question_ids
                .iter()
                .map(|id| topic_of(&store, id))
                .collect();
            assert!(topics.contains("topic1"));
            assert!(topics.contains("topic2"));
        }
    }

    #[test]
    fn more_than_unsolved_is_insufficient() {
        let store = three_question_pool();
        let mut rng = StdRng::seed_from_u64(0);
        let err = select(&store, &ExamRequest::new(5), fixed_now(), &mut rng).unwrap_err();
        assert_eq!(
            err,
            SelectError::InsufficientQuestions {
                requested: 5,
                available: 3
            }
        );
    }

    #[test]
    fn only_unsolved_questions_are_candidates() {
        let mut store = three_question_pool();
        store.mark_solved(&"A".into(), fixed_now()).unwrap();
        store.mark_solved(&"C".into(), fixed_now()).unwrap();

        let mut rng = StdRng::seed_from_u64(0);
        let selection = select(&store, &ExamRequest::new(1), fixed_now(), &mut rng).unwrap();
        assert_eq!(selection.question_ids, vec![QuestionId::new("B")]);

        let err = select(&store, &ExamRequest::new(2), fixed_now(), &mut rng).unwrap_err();
        assert!(err.is_shortfall());
    }

    #[test]
    fn fully_solved_pool_is_insufficient_even_one_per_topic() {
        let mut store = three_question_pool();
        for id in ["A", "B", "C"] {
            store.mark_solved(&id.into(), fixed_now()).unwrap();
        }
        let mut rng = StdRng::seed_from_u64(0);
        let request = ExamRequest::new(1).one_per_topic(true);
        let err = select(&store, &request, fixed_now(), &mut rng).unwrap_err();
        assert!(err.is_shortfall());
    }

    #[test]
    fn zero_count_is_invalid() {
        let store = three_question_pool();
        let mut rng = StdRng::seed_from_u64(0);
        let err = select(&store, &ExamRequest::new(0), fixed_now(), &mut rng).unwrap_err();
        assert_eq!(err, SelectError::InvalidCount(0));
    }

    #[test]
    fn same_seed_same_selection() {
        let store = wide_pool(4, 6);
        let request = ExamRequest::new(9);
        let a = select(&store, &request, fixed_now(), &mut StdRng::seed_from_u64(42)).unwrap();
        let b = select(&store, &request, fixed_now(), &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn selection_does_not_mutate_pool() {
        let store = wide_pool(3, 3);
        let before = store.clone();
        let mut rng = StdRng::seed_from_u64(9);
        select(&store, &ExamRequest::new(5), fixed_now(), &mut rng).unwrap();
        assert_eq!(store, before);
    }

    #[test]
    fn whole_pool_can_be_selected() {
        let store = wide_pool(2, 3);
        let mut rng = StdRng::seed_from_u64(5);
        let selection = select(&store, &ExamRequest::new(6), fixed_now(), &mut rng).unwrap();
        let unique: HashSet<QuestionId> = selection.question_ids.iter().cloned().collect();
        let expected: HashSet<QuestionId> = store.unsolved().into_iter().collect();
        assert_eq!(unique, expected);
    }
}
