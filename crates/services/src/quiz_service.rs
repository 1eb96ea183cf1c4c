use std::sync::Arc;

use quiz_core::model::{GenerationRequest, Question};
use quiz_core::{RecencyStore, SimilarityFilter};
use tracing::{debug, info};

use crate::question_source::QuestionSource;

/// Server-side quiz orchestration: fetch, filter against history, select, record.
#[derive(Clone)]
pub struct QuizService {
    source: QuestionSource,
    history: Arc<dyn RecencyStore>,
    filter: SimilarityFilter,
}

impl QuizService {
    /// Build a service using the server similarity threshold.
    #[must_use]
    pub fn new(source: QuestionSource, history: Arc<dyn RecencyStore>) -> Self {
        Self {
            source,
            history,
            filter: SimilarityFilter::server(),
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: SimilarityFilter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn history(&self) -> Arc<dyn RecencyStore> {
        Arc::clone(&self.history)
    }

    /// Produce up to `request.desired_count` questions for the topic.
    ///
    /// The result is never empty: generation failures surface as the fallback
    /// question. Served questions are recorded in the topic history.
    pub async fn generate_quiz(&self, request: &GenerationRequest) -> Vec<Question> {
        let recent = self.history.get(&request.topic);
        let candidates = self.source.generate(request, &recent).await;
        let fresh = self.filter.retain_fresh(&candidates, &recent);
        debug!(
            topic = %request.topic,
            candidates = candidates.len(),
            fresh = fresh.len(),
            "filtered generated candidates"
        );

        let selection = select_final(fresh, candidates, request.desired_count);
        let tracked = self.history.append(&request.topic, &selection);
        info!(topic = %request.topic, tracked, "tracking previous questions for topic");
        selection
    }
}

/// Take the first `desired` fresh questions when there are enough; otherwise
/// serve the unfiltered candidates truncated to `desired`.
///
/// The unfiltered branch can hand back questions the filter just rejected.
/// Returning a full quiz is preferred over returning a short one.
#[must_use]
pub fn select_final(
    mut fresh: Vec<Question>,
    mut candidates: Vec<Question>,
    desired: usize,
) -> Vec<Question> {
    if fresh.len() >= desired {
        fresh.truncate(desired);
        fresh
    } else {
        debug!(
            fresh = fresh.len(),
            desired, "not enough fresh candidates, serving unfiltered list"
        );
        candidates.truncate(desired);
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(text: &str) -> Question {
        Question::new(text, vec!["a".into(), "b".into(), "c".into(), "d".into()], "a")
    }

    #[test]
    fn prefers_fresh_when_enough() {
        let fresh = vec![q("f1"), q("f2"), q("f3")];
        let raw = vec![q("r1"), q("f1"), q("f2"), q("f3")];
        let out = select_final(fresh, raw, 2);
        assert_eq!(out, vec![q("f1"), q("f2")]);
    }

    #[test]
    fn falls_back_to_unfiltered_when_short() {
        let fresh = vec![q("f1")];
        let raw = vec![q("dup"), q("f1"), q("dup2"), q("x")];
        let out = select_final(fresh, raw, 3);
        assert_eq!(out, vec![q("dup"), q("f1"), q("dup2")]);
    }

    #[test]
    fn returns_what_exists_when_candidates_short() {
        let out = select_final(Vec::new(), vec![q("only")], 5);
        assert_eq!(out, vec![q("only")]);
    }
}
