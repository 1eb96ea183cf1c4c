use std::sync::{Arc, LazyLock};

use quiz_core::model::{GenerationRequest, Question};
use regex::Regex;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::completion::{CompletionClient, CompletionPrompt};
use crate::error::CompletionError;

const SYSTEM_PROMPT: &str = "You are a creative quiz generator that creates diverse, unique \
questions on various topics. Each question should explore a different aspect of the topic. \
Return your response as a JSON object with a 'questions' array. Each question in the array \
should have 'question', 'options', and 'answer' fields.";

static EMBEDDED_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[.*\]").expect("valid array pattern"));
static EMBEDDED_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid object pattern"));

/// Result of one generation attempt, before any fallback is applied.
#[derive(Debug)]
pub enum GenerationOutcome {
    Parsed(Vec<Question>),
    Malformed(String),
    Failed(CompletionError),
}

impl GenerationOutcome {
    /// Parsed questions, or the single fallback question for the other branches.
    #[must_use]
    pub fn into_questions(self) -> Vec<Question> {
        match self {
            GenerationOutcome::Parsed(questions) => questions,
            GenerationOutcome::Malformed(raw) => {
                warn!(len = raw.len(), "generator output unparseable, using fallback question");
                vec![Question::fallback()]
            }
            GenerationOutcome::Failed(err) => {
                warn!(error = %err, "question generation failed, using fallback question");
                vec![Question::fallback()]
            }
        }
    }
}

/// Turns a completion service into batches of candidate questions.
#[derive(Clone)]
pub struct QuestionSource {
    client: Arc<dyn CompletionClient>,
}

impl QuestionSource {
    #[must_use]
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Ask for `request.candidate_count()` questions, steering away from `recent`.
    pub async fn fetch(&self, request: &GenerationRequest, recent: &[Question]) -> GenerationOutcome {
        let prompt = build_prompt(
            &request.topic,
            request.candidate_count(),
            request.temperature,
            recent,
        );
        match self.client.complete(&prompt).await {
            Ok(raw) => parse_candidates(&raw),
            Err(err) => GenerationOutcome::Failed(err),
        }
    }

    /// Like `fetch`, but never empty: failures collapse into the fallback question.
    pub async fn generate(&self, request: &GenerationRequest, recent: &[Question]) -> Vec<Question> {
        self.fetch(request, recent).await.into_questions()
    }
}

#[must_use]
pub fn build_prompt(
    topic: &str,
    candidate_count: usize,
    temperature: f64,
    recent: &[Question],
) -> CompletionPrompt {
    let recent_block = if recent.is_empty() {
        String::new()
    } else {
        let texts: Vec<&str> = recent.iter().map(Question::text).collect();
        let listed = serde_json::to_string(&texts).unwrap_or_else(|e| {
            warn!(error = %e, "failed to list recent questions in the prompt");
            String::from("[]")
        });
        format!(
            "IMPORTANT: You MUST generate COMPLETELY NEW and ORIGINAL questions that are \
             different from these recently used questions: {listed}.\n\
             Do not repeat the same concepts, question structures, or answers. Create \
             questions on different aspects of the topic."
        )
    };

    let user = format!(
        "Generate {candidate_count} COMPLETELY DIFFERENT multiple-choice questions about {topic}.\n\
         Ensure each question covers a unique aspect of the topic.\n\
         Each question should have a question, an array of 4 options, and the correct answer.\n\
         {recent_block}\n\n\
         IMPORTANT GUIDELINES:\n\
         1. Make sure each question is truly unique - don't ask similar questions with different wording\n\
         2. Cover a wide range of subtopics within the main topic\n\
         3. Vary the difficulty level across questions\n\
         4. Use a mix of factual, conceptual, and analytical questions"
    );

    CompletionPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
        temperature,
    }
}

/// Parse raw generator text, falling back to the first embedded list or
/// object literal when the whole text is not JSON.
#[must_use]
pub fn parse_candidates(raw: &str) -> GenerationOutcome {
    if let Ok(value) = serde_json::from_str::<JsonValue>(raw.trim()) {
        return outcome_from_value(value, raw);
    }

    for pattern in [&*EMBEDDED_ARRAY, &*EMBEDDED_OBJECT] {
        let Some(found) = pattern.find(raw) else {
            continue;
        };
        let Ok(value) = serde_json::from_str::<JsonValue>(found.as_str()) else {
            continue;
        };
        debug!("extracted embedded JSON from generator text");
        if let parsed @ GenerationOutcome::Parsed(_) = outcome_from_value(value, raw) {
            return parsed;
        }
    }

    GenerationOutcome::Malformed(raw.to_string())
}

fn outcome_from_value(value: JsonValue, raw: &str) -> GenerationOutcome {
    let items = match value {
        JsonValue::Array(items) => items,
        JsonValue::Object(mut map) => match map.remove("questions") {
            Some(JsonValue::Array(items)) => items,
            Some(_) => Vec::new(),
            None => vec![JsonValue::Object(map)],
        },
        _ => Vec::new(),
    };

    let questions: Vec<Question> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();

    if questions.is_empty() {
        GenerationOutcome::Malformed(raw.to_string())
    } else {
        GenerationOutcome::Parsed(questions)
    }
}
