//! Per-topic history of recently served questions.
//!
//! Each topic keeps its questions in insertion order, bounded to a fixed
//! length; the oldest entries are dropped first. Topics are matched exactly
//! (case-sensitive, not normalized).

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::model::Question;

/// History bound for the server-side store.
pub const SERVER_HISTORY_LIMIT: usize = 50;

/// History bound for the client-side store.
pub const CLIENT_HISTORY_LIMIT: usize = 100;

/// Owned, bounded per-topic question history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicHistory {
    limit: usize,
    topics: HashMap<String, Vec<Question>>,
}

impl TopicHistory {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            topics: HashMap::new(),
        }
    }

    /// Rebuild a history from a persisted mapping, enforcing `limit` on each topic.
    #[must_use]
    pub fn from_topics(topics: HashMap<String, Vec<Question>>, limit: usize) -> Self {
        let mut history = Self { limit, topics };
        for questions in history.topics.values_mut() {
            truncate_oldest(questions, limit);
        }
        history
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[must_use]
    pub fn topics(&self) -> &HashMap<String, Vec<Question>> {
        &self.topics
    }

    /// Questions recorded for `topic`, oldest first; empty if the topic is unseen.
    #[must_use]
    pub fn get(&self, topic: &str) -> &[Question] {
        self.topics.get(topic).map_or(&[], Vec::as_slice)
    }

    /// Record `questions` under `topic`, skipping any whose exact text is
    /// already present, then evict the oldest beyond the limit.
    ///
    /// Returns the number of questions now tracked for the topic.
    pub fn append(&mut self, topic: &str, questions: &[Question]) -> usize {
        let entry = self.topics.entry(topic.to_string()).or_default();
        for question in questions {
            if entry.iter().any(|seen| seen.text() == question.text()) {
                continue;
            }
            entry.push(question.clone());
        }
        truncate_oldest(entry, self.limit);
        entry.len()
    }

    /// Forget every topic.
    pub fn clear(&mut self) {
        self.topics.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.values().all(Vec::is_empty)
    }
}

fn truncate_oldest(questions: &mut Vec<Question>, limit: usize) {
    if questions.len() > limit {
        let excess = questions.len() - limit;
        questions.drain(..excess);
    }
}

/// Shared dedup reference set consulted before serving questions.
pub trait RecencyStore: Send + Sync {
    /// Snapshot of the history for `topic`, oldest first.
    fn get(&self, topic: &str) -> Vec<Question>;

    /// Record served questions; returns the number now tracked for `topic`.
    fn append(&self, topic: &str, questions: &[Question]) -> usize;
}

/// Process-lifetime store guarded by a mutex.
///
/// Concurrent requests for the same topic may interleave their `get` and
/// `append` calls; each call on its own is atomic.
#[derive(Debug)]
pub struct InMemoryRecencyStore {
    inner: Mutex<TopicHistory>,
}

impl InMemoryRecencyStore {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            inner: Mutex::new(TopicHistory::new(limit)),
        }
    }
}

impl Default for InMemoryRecencyStore {
    fn default() -> Self {
        Self::new(SERVER_HISTORY_LIMIT)
    }
}

impl RecencyStore for InMemoryRecencyStore {
    fn get(&self, topic: &str) -> Vec<Question> {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.get(topic).to_vec()
    }

    fn append(&self, topic: &str, questions: &[Question]) -> usize {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.append(topic, questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(text: impl Into<String>) -> Question {
        Question::new(text, vec!["a".into(), "b".into(), "c".into(), "d".into()], "a")
    }

    #[test]
    fn unseen_topic_is_empty() {
        let history = TopicHistory::new(5);
        assert!(history.get("Math").is_empty());
        assert!(history.is_empty());
    }

    #[test]
    fn skips_exact_text_repeats() {
        let mut history = TopicHistory::new(10);
        history.append("Math", &[q("What is 1+1?"), q("What is 1+1?")]);
        let tracked = history.append("Math", &[q("What is 1+1?"), q("What is 3*3?")]);
        assert_eq!(tracked, 2);
    }

    #[test]
    fn topics_are_case_sensitive() {
        let mut history = TopicHistory::new(10);
        history.append("Math", &[q("one")]);
        assert!(history.get("math").is_empty());
        assert_eq!(history.get("Math").len(), 1);
    }

    #[test]
    fn sixty_appends_keep_latest_fifty() {
        let store = InMemoryRecencyStore::new(SERVER_HISTORY_LIMIT);
        for i in 0..60 {
            let tracked = store.append("Science", &[q(format!("question {i}"))]);
            assert!(tracked <= SERVER_HISTORY_LIMIT);
        }
        let kept = store.get("Science");
        assert_eq!(kept.len(), 50);
        assert_eq!(kept.first().unwrap().text(), "question 10");
        assert_eq!(kept.last().unwrap().text(), "question 59");
    }

    #[test]
    fn bulk_append_never_exceeds_limit() {
        let mut history = TopicHistory::new(3);
        let batch: Vec<_> = (0..7).map(|i| q(format!("q{i}"))).collect();
        history.append("History", &batch);
        let texts: Vec<_> = history.get("History").iter().map(Question::text).collect();
        assert_eq!(texts, vec!["q4", "q5", "q6"]);
    }

    #[test]
    fn from_topics_enforces_limit() {
        let mut topics = HashMap::new();
        topics.insert("Art".to_string(), (0..5).map(|i| q(format!("a{i}"))).collect());
        let history = TopicHistory::from_topics(topics, 2);
        assert_eq!(history.get("Art").len(), 2);
        assert_eq!(history.get("Art")[0].text(), "a3");
    }

    #[test]
    fn clear_forgets_everything() {
        let mut history = TopicHistory::new(CLIENT_HISTORY_LIMIT);
        history.append("Math", &[q("one")]);
        history.append("Art", &[q("two")]);
        history.clear();
        assert!(history.is_empty());
        assert!(history.get("Math").is_empty());
    }
}
