//! Lexical near-duplicate detection for question text.
//!
//! Two texts are similar when their normalized forms are equal, or when the
//! share of common words over all distinct words exceeds a threshold.

use std::collections::HashSet;

use crate::model::Question;

/// Threshold used by the server before it answers a quiz request.
pub const SERVER_SIMILARITY_THRESHOLD: f64 = 0.7;

/// Threshold used by the client before it displays a quiz.
pub const CLIENT_SIMILARITY_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityFilter {
    threshold: f64,
}

impl SimilarityFilter {
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    #[must_use]
    pub fn server() -> Self {
        Self::new(SERVER_SIMILARITY_THRESHOLD)
    }

    #[must_use]
    pub fn client() -> Self {
        Self::new(CLIENT_SIMILARITY_THRESHOLD)
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Symmetric near-duplicate check.
    #[must_use]
    pub fn is_similar(&self, a: &str, b: &str) -> bool {
        let a = normalize(a);
        let b = normalize(b);
        if a == b {
            return true;
        }
        token_overlap(&a, &b) > self.threshold
    }

    /// Returns true if `candidate` is similar to any question in `history`.
    #[must_use]
    pub fn matches_any(&self, candidate: &Question, history: &[Question]) -> bool {
        history
            .iter()
            .any(|seen| self.is_similar(candidate.text(), seen.text()))
    }

    /// Candidates not similar to anything in `history`, in their original order.
    #[must_use]
    pub fn retain_fresh(&self, candidates: &[Question], history: &[Question]) -> Vec<Question> {
        candidates
            .iter()
            .filter(|candidate| !self.matches_any(candidate, history))
            .cloned()
            .collect()
    }
}

/// Lowercase, drop everything except word characters and whitespace, trim.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Jaccard ratio over whitespace-separated words of two normalized strings.
fn token_overlap(a: &str, b: &str) -> f64 {
    let left: HashSet<&str> = a.split_whitespace().collect();
    let right: HashSet<&str> = b.split_whitespace().collect();
    let shared = left.intersection(&right).count();
    let union = left.len() + right.len() - shared;
    if union == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = shared as f64 / union as f64;
    ratio
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(text: &str) -> Question {
        Question::new(text, vec!["a".into(), "b".into(), "c".into(), "d".into()], "a")
    }

    #[test]
    fn normalize_strips_punctuation_and_case() {
        assert_eq!(normalize("  What's the Capital of France?! "), "whats the capital of france");
        assert_eq!(normalize("snake_case stays"), "snake_case stays");
    }

    #[test]
    fn identical_text_is_similar() {
        let f = SimilarityFilter::server();
        for text in ["What is 2 + 2?", "x", "Who painted the Mona Lisa"] {
            assert!(f.is_similar(text, text));
        }
    }

    #[test]
    fn punctuation_and_case_do_not_matter() {
        let f = SimilarityFilter::server();
        assert!(f.is_similar("What is DNA?", "what is dna"));
    }

    #[test]
    fn overlap_above_threshold_is_similar() {
        // 4 shared of 5 distinct = 0.8
        let f = SimilarityFilter::server();
        assert!(f.is_similar(
            "what is the largest planet",
            "what is the largest"
        ));
    }

    #[test]
    fn overlap_at_threshold_is_not_similar() {
        // 7 shared of 10 distinct = 0.7, not strictly greater
        let f = SimilarityFilter::server();
        let a = "one two three four five six seven eight";
        let b = "one two three four five six seven nine ten";
        assert!(!f.is_similar(a, b));
        assert!(SimilarityFilter::client().is_similar(a, b));
    }

    #[test]
    fn unrelated_questions_are_distinct() {
        let f = SimilarityFilter::client();
        assert!(!f.is_similar(
            "Who wrote Pride and Prejudice?",
            "What is the boiling point of water?"
        ));
    }

    #[test]
    fn similarity_is_symmetric() {
        let f = SimilarityFilter::client();
        let pairs = [
            ("what is the speed of light", "what is the speed of sound in air"),
            ("a b c", "a b c d e f g"),
            ("Name a prime number", "name the smallest prime number"),
            ("", "anything"),
        ];
        for (a, b) in pairs {
            assert_eq!(f.is_similar(a, b), f.is_similar(b, a), "{a} / {b}");
        }
    }

    #[test]
    fn retain_fresh_keeps_order_and_drops_repeats() {
        let f = SimilarityFilter::server();
        let history = vec![q("What is the capital of Spain?")];
        let candidates = vec![
            q("Who discovered penicillin?"),
            q("what is the capital of spain"),
            q("How many legs does a spider have?"),
        ];
        let fresh = f.retain_fresh(&candidates, &history);
        let texts: Vec<_> = fresh.iter().map(Question::text).collect();
        assert_eq!(
            texts,
            vec!["Who discovered penicillin?", "How many legs does a spider have?"]
        );
    }
}
