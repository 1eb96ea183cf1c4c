use serde::{Deserialize, Serialize};

/// A single multiple-choice quiz question.
///
/// Generators are asked for four options with `correct_answer` being one of
/// them; neither property is enforced here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    text: String,
    options: Vec<String>,
    #[serde(rename = "answer")]
    correct_answer: String,
}

impl Question {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            options,
            correct_answer: correct_answer.into(),
        }
    }

    /// The question served whenever generation yields nothing usable.
    #[must_use]
    pub fn fallback() -> Self {
        Self::new(
            "What is 2 + 2?",
            vec!["3".into(), "4".into(), "5".into(), "6".into()],
            "4",
        )
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    /// Returns true if `choice` matches the correct answer exactly.
    #[must_use]
    pub fn is_correct(&self, choice: &str) -> bool {
        self.correct_answer == choice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_wire_field_names() {
        let json = serde_json::to_value(Question::fallback()).unwrap();
        assert_eq!(json["question"], "What is 2 + 2?");
        assert_eq!(json["answer"], "4");
        assert_eq!(json["options"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn parses_generator_shape() {
        let q: Question = serde_json::from_str(
            r#"{"question":"Capital of France?","options":["Paris","Rome","Oslo","Bern"],"answer":"Paris"}"#,
        )
        .unwrap();
        assert_eq!(q.text(), "Capital of France?");
        assert!(q.is_correct("Paris"));
        assert!(!q.is_correct("Rome"));
    }
}
