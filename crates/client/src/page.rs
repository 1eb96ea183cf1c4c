//! The quiz page: topic choice, question display, refresh, scoring.
//!
//! `Home` moves to `Quiz` when a topic is picked. Refresh keeps the page on
//! `Quiz` with a new question set and no score; submit moves to `Scored`
//! over the same questions; reset always returns to `Home`.

use std::collections::HashMap;
use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::api::{DEFAULT_TOPIC, LoginRequest, QuizRequest, RegisterRequest, SaveScoreRequest};
use quiz_core::model::{Question, ScoreRecord, UserProfile};
use quiz_core::refresh::topic_variation;
use tracing::{debug, error, info, warn};

use crate::api::QuizApi;
use crate::error::ClientError;
use crate::history::ClientHistory;
use crate::kv::KeyValueStore;
use crate::session::Session;

pub const QUESTIONS_PER_QUIZ: usize = 5;

/// Fewest client-fresh questions worth showing instead of the server's list.
pub const CLIENT_MIN_FRESH: usize = 3;

pub const ALERT_EMPTY_TOPIC: &str = "Please enter a topic";
pub const ALERT_LOAD_FAILED: &str = "Failed to load quiz questions. Please try again.";
pub const ALERT_LOAD_ERROR: &str = "Something went wrong loading the quiz.";
pub const ALERT_HISTORY_CLEARED: &str =
    "Question history has been cleared. You'll now see fresh questions!";
pub const ALERT_USERNAME_REQUIRED: &str = "Username is required for sign up.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Math,
    Science,
    English,
    ComputerScience,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Math,
        Category::Science,
        Category::English,
        Category::ComputerScience,
    ];

    #[must_use]
    pub fn id(self) -> u32 {
        match self {
            Category::Math => 19,
            Category::Science => 17,
            Category::English => 25,
            Category::ComputerScience => 18,
        }
    }

    #[must_use]
    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }

    #[must_use]
    pub fn topic(self) -> &'static str {
        match self {
            Category::Math => "Math",
            Category::Science => "Science",
            Category::English => "English",
            Category::ComputerScience => "Computer Science",
        }
    }
}

/// Topic for a category pick; anything unrecognised means general knowledge.
#[must_use]
pub fn topic_for_category(id: Option<u32>) -> &'static str {
    id.and_then(Category::from_id)
        .map_or(DEFAULT_TOPIC, Category::topic)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Home,
    Quiz,
    Scored { correct: usize, total: usize },
}

pub struct QuizPage {
    api: Arc<dyn QuizApi>,
    history: ClientHistory,
    session: Session,
    clock: Clock,
    state: PageState,
    topic: String,
    questions: Vec<Question>,
    answers: HashMap<usize, String>,
    refresh_count: u32,
    alerts: Vec<String>,
}

impl QuizPage {
    /// Open the page with history and session restored from `store`.
    #[must_use]
    pub fn new(api: Arc<dyn QuizApi>, store: Arc<dyn KeyValueStore>, clock: Clock) -> Self {
        Self {
            api,
            history: ClientHistory::load(Arc::clone(&store)),
            session: Session::load(store),
            clock,
            state: PageState::Home,
            topic: String::new(),
            questions: Vec::new(),
            answers: HashMap::new(),
            refresh_count: 0,
            alerts: Vec::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> PageState {
        self.state
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answer_for(&self, index: usize) -> Option<&str> {
        self.answers.get(&index).map(String::as_str)
    }

    #[must_use]
    pub fn refresh_count(&self) -> u32 {
        self.refresh_count
    }

    #[must_use]
    pub fn history(&self) -> &ClientHistory {
        &self.history
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserProfile> {
        self.session.user()
    }

    #[must_use]
    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    /// Drain pending alerts for display.
    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    fn alert(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(%message, "alert");
        self.alerts.push(message);
    }

    /// Log in and remember the user.
    ///
    /// # Errors
    ///
    /// Returns the server's rejection or a transport error; the message is
    /// also raised as an alert.
    pub async fn log_in(&mut self, email: &str, password: &str) -> Result<(), ClientError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let user = match self.api.login(&request).await {
            Ok(user) => user,
            Err(e) => {
                self.alert(e.to_string());
                return Err(e);
            }
        };
        info!(user_id = %user.id, "logged in");
        self.session.sign_in(user)
    }

    /// Register, then log in with the same credentials.
    ///
    /// # Errors
    ///
    /// As for `log_in`. A blank username is rejected before any request.
    pub async fn sign_up(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ClientError> {
        if username.trim().is_empty() {
            self.alert(ALERT_USERNAME_REQUIRED);
            return Err(ClientError::Api {
                status: 400,
                message: ALERT_USERNAME_REQUIRED.to_string(),
            });
        }

        let request = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        if let Err(e) = self.api.register(&request).await {
            self.alert(e.to_string());
            return Err(e);
        }
        self.log_in(email, password).await
    }

    /// # Errors
    ///
    /// Returns `ClientError` if the stored user cannot be removed.
    pub fn sign_out(&mut self) -> Result<(), ClientError> {
        self.reset();
        self.session.sign_out()
    }

    /// Scores for the logged-in user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotLoggedIn` without a user, or the request error.
    pub async fn profile_scores(&self) -> Result<Vec<ScoreRecord>, ClientError> {
        let user = self.session.user().ok_or(ClientError::NotLoggedIn)?;
        self.api.list_scores(user.id).await
    }

    pub async fn pick_category(&mut self, id: Option<u32>) {
        self.start_quiz(topic_for_category(id)).await;
    }

    pub async fn submit_custom_topic(&mut self, topic: &str) {
        if topic.trim().is_empty() {
            self.alert(ALERT_EMPTY_TOPIC);
            return;
        }
        self.start_quiz(topic).await;
    }

    /// Start a new quiz from home; the refresh counter starts over.
    pub async fn start_quiz(&mut self, topic: &str) {
        self.refresh_count = 0;
        self.answers.clear();
        self.load_questions(topic.to_string(), false).await;
    }

    /// Fetch a new set for the current topic, keeping the chosen answers.
    pub async fn refresh(&mut self) {
        if self.state == PageState::Home {
            debug!("refresh ignored on the home page");
            return;
        }
        let topic = self.topic.clone();
        self.load_questions(topic, true).await;
    }

    pub fn answer(&mut self, index: usize, option: &str) {
        if self.state == PageState::Home || index >= self.questions.len() {
            return;
        }
        self.answers.insert(index, option.to_string());
    }

    /// Score the current answers and save the result for the logged-in user.
    ///
    /// A failed save is logged and does not change the page.
    pub async fn submit(&mut self) -> usize {
        let total = self.questions.len();
        let correct = self
            .questions
            .iter()
            .enumerate()
            .filter(|(index, question)| {
                self.answers
                    .get(index)
                    .is_some_and(|answer| question.is_correct(answer))
            })
            .count();
        self.state = PageState::Scored { correct, total };

        let Some(user) = self.session.user() else {
            warn!("no logged-in user, score not saved");
            return correct;
        };
        let request = SaveScoreRequest {
            user_id: user.id,
            topic: self.topic.clone(),
            score: u32::try_from(correct).unwrap_or(u32::MAX),
            total_questions: u32::try_from(total).unwrap_or(u32::MAX),
        };
        match self.api.save_score(&request).await {
            Ok(saved) => info!(score_id = %saved.id, "Score saved successfully"),
            Err(e) => error!(error = %e, "Error saving score"),
        }
        correct
    }

    /// Back to home. The refresh counter is left as is.
    pub fn reset(&mut self) {
        self.questions.clear();
        self.answers.clear();
        self.topic.clear();
        self.state = PageState::Home;
    }

    pub fn clear_history(&mut self) {
        if let Err(e) = self.history.clear() {
            error!(error = %e, "failed to clear stored question history");
        }
        self.alert(ALERT_HISTORY_CLEARED);
    }

    async fn load_questions(&mut self, topic: String, is_refresh: bool) {
        if let PageState::Scored { .. } = self.state {
            self.state = PageState::Quiz;
        }

        let mut request = QuizRequest {
            topic: Some(topic.clone()),
            count: Some(QUESTIONS_PER_QUIZ),
            ..QuizRequest::default()
        };
        if is_refresh {
            request.refresh_id = Some(self.clock.epoch_millis());
            request.refresh_count = Some(self.refresh_count);
            if let Some(variation) = topic_variation(&topic, self.refresh_count) {
                info!("Using topic variation: {variation}");
                request.topic = Some(variation);
            }
            self.refresh_count += 1;
        }

        let candidates = match self.api.generate_quiz(&request).await {
            Ok(questions) => questions,
            Err(ClientError::Http(e)) if e.is_decode() => {
                error!(error = %e, "Invalid quiz format");
                self.alert(ALERT_LOAD_FAILED);
                return;
            }
            Err(e) => {
                error!(error = %e, "Error fetching quiz questions");
                self.alert(ALERT_LOAD_ERROR);
                return;
            }
        };

        let shown = self.pick_shown(&topic, candidates);
        if let Err(e) = self.history.record(&topic, &shown) {
            warn!(error = %e, "failed to persist question history");
        }

        self.topic = topic;
        self.questions = shown;
        self.state = PageState::Quiz;
    }

    fn pick_shown(&self, topic: &str, candidates: Vec<Question>) -> Vec<Question> {
        let fresh = self.history.fresh_among(topic, &candidates);
        if fresh.len() < candidates.len() {
            info!(
                "Filtered out {} duplicate questions",
                candidates.len() - fresh.len()
            );
        }
        if fresh.len() >= CLIENT_MIN_FRESH {
            fresh
        } else {
            candidates
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_map_to_topics() {
        assert_eq!(topic_for_category(Some(19)), "Math");
        assert_eq!(topic_for_category(Some(17)), "Science");
        assert_eq!(topic_for_category(Some(25)), "English");
        assert_eq!(topic_for_category(Some(18)), "Computer Science");
        assert_eq!(topic_for_category(Some(9)), DEFAULT_TOPIC);
        assert_eq!(topic_for_category(None), DEFAULT_TOPIC);
    }
}
