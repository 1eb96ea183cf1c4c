use std::collections::HashMap;
use std::sync::Arc;

use quiz_core::model::Question;
use quiz_core::recency::CLIENT_HISTORY_LIMIT;
use quiz_core::{SimilarityFilter, TopicHistory};
use tracing::warn;

use crate::error::ClientError;
use crate::kv::KeyValueStore;

/// Storage key for the per-topic question history.
pub const HISTORY_KEY: &str = "previousQuestions";

/// The client's own recency layer: a persisted `TopicHistory` filtered with
/// the looser client threshold.
pub struct ClientHistory {
    store: Arc<dyn KeyValueStore>,
    history: TopicHistory,
    filter: SimilarityFilter,
}

impl ClientHistory {
    /// Load the persisted history; unreadable or malformed state starts empty.
    #[must_use]
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let topics = match store.get(HISTORY_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<HashMap<String, Vec<Question>>>(&raw)
                .unwrap_or_else(|e| {
                    warn!(error = %e, "stored question history is malformed, starting empty");
                    HashMap::new()
                }),
            Ok(None) => HashMap::new(),
            Err(e) => {
                warn!(error = %e, "failed to read stored question history, starting empty");
                HashMap::new()
            }
        };

        Self {
            store,
            history: TopicHistory::from_topics(topics, CLIENT_HISTORY_LIMIT),
            filter: SimilarityFilter::client(),
        }
    }

    #[must_use]
    pub fn recent(&self, topic: &str) -> &[Question] {
        self.history.get(topic)
    }

    #[must_use]
    pub fn topics(&self) -> &HashMap<String, Vec<Question>> {
        self.history.topics()
    }

    /// Candidates not similar to anything already seen for `topic`.
    #[must_use]
    pub fn fresh_among(&self, topic: &str, candidates: &[Question]) -> Vec<Question> {
        self.filter.retain_fresh(candidates, self.history.get(topic))
    }

    /// Append the displayed set and persist the whole map.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the history cannot be written.
    pub fn record(&mut self, topic: &str, shown: &[Question]) -> Result<usize, ClientError> {
        let tracked = self.history.append(topic, shown);
        self.persist()?;
        Ok(tracked)
    }

    /// Forget every topic and drop the persisted key.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the key cannot be removed.
    pub fn clear(&mut self) -> Result<(), ClientError> {
        self.history.clear();
        self.store.remove(HISTORY_KEY)?;
        Ok(())
    }

    fn persist(&self) -> Result<(), ClientError> {
        if self.history.is_empty() {
            return Ok(());
        }
        let raw = serde_json::to_string(self.history.topics())?;
        self.store.set(HISTORY_KEY, &raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;

    fn q(text: &str) -> Question {
        Question::new(text, vec!["a".into(), "b".into(), "c".into(), "d".into()], "a")
    }

    #[test]
    fn persisted_history_reloads_unchanged() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let mut history = ClientHistory::load(Arc::clone(&store));
        history
            .record("Math", &[q("What is a prime number?"), q("What is pi?")])
            .unwrap();
        history.record("Science", &[q("What is an atom?")]).unwrap();

        let reloaded = ClientHistory::load(store);
        assert_eq!(reloaded.topics(), history.topics());
        assert_eq!(reloaded.recent("Math").len(), 2);
    }

    #[test]
    fn malformed_state_is_treated_as_empty() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        store.set(HISTORY_KEY, "{not json").unwrap();
        let history = ClientHistory::load(store);
        assert!(history.topics().is_empty());
    }

    #[test]
    fn client_threshold_is_looser_than_server() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let mut history = ClientHistory::load(store);
        history
            .record("Science", &[q("What is the chemical symbol for gold?")])
            .unwrap();

        // 6 shared of 8 distinct tokens: 0.75.
        let near = q("What is the chemical symbol for silver?");
        // 5 shared of 10 distinct tokens: 0.5.
        let other = q("What is the chemical formula for table salt?");
        let fresh = history.fresh_among("Science", &[near, other.clone()]);
        assert_eq!(fresh, vec![other]);
    }

    #[test]
    fn clear_removes_persisted_key() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let mut history = ClientHistory::load(Arc::clone(&store));
        history.record("Math", &[q("What is pi?")]).unwrap();
        history.clear().unwrap();
        assert!(history.recent("Math").is_empty());
        assert_eq!(store.get(HISTORY_KEY).unwrap(), None);
    }

    #[test]
    fn history_is_bounded_per_topic() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let mut history = ClientHistory::load(store);
        for i in 0..120 {
            history.record("Math", &[q(&format!("question {i}"))]).unwrap();
        }
        let recent = history.recent("Math");
        assert_eq!(recent.len(), CLIENT_HISTORY_LIMIT);
        assert_eq!(recent[0].text(), "question 20");
    }
}
