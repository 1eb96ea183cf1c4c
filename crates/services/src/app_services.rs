use std::sync::Arc;

use quiz_core::recency::SERVER_HISTORY_LIMIT;
use quiz_core::{Clock, InMemoryRecencyStore, RecencyStore};
use storage::repository::Storage;
use tracing::{info, warn};

use crate::account_service::AccountService;
use crate::completion::{CompletionClient, CompletionConfig, OpenAiCompletionClient};
use crate::error::AppServicesError;
use crate::question_source::QuestionSource;
use crate::quiz_service::QuizService;
use crate::score_service::ScoreService;

/// Assembles the server-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    quiz: Arc<QuizService>,
    accounts: Arc<AccountService>,
    scores: Arc<ScoreService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and an OpenAI-compatible generator.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or HTTP client setup fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        completion: Option<CompletionConfig>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let generator = OpenAiCompletionClient::new(completion)?;
        match generator.model() {
            Some(model) => info!(model, "question generation enabled"),
            None => warn!("OPENAI_API_KEY not set, every quiz will use the fallback question"),
        }
        Ok(Self::from_parts(clock, &storage, Arc::new(generator)))
    }

    /// Wire services from already-built collaborators.
    #[must_use]
    pub fn from_parts(
        clock: Clock,
        storage: &Storage,
        generator: Arc<dyn CompletionClient>,
    ) -> Self {
        let history: Arc<dyn RecencyStore> =
            Arc::new(InMemoryRecencyStore::new(SERVER_HISTORY_LIMIT));
        let quiz = Arc::new(QuizService::new(QuestionSource::new(generator), history));
        let accounts = Arc::new(AccountService::new(clock, Arc::clone(&storage.users)));
        let scores = Arc::new(ScoreService::new(clock, Arc::clone(&storage.scores)));

        Self {
            quiz,
            accounts,
            scores,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn accounts(&self) -> Arc<AccountService> {
        Arc::clone(&self.accounts)
    }

    #[must_use]
    pub fn scores(&self) -> Arc<ScoreService> {
        Arc::clone(&self.scores)
    }
}
