use std::sync::Arc;

use services::{AccountService, AppServices, QuizService, ScoreService};

pub struct State {
    pub quiz: Arc<QuizService>,
    pub accounts: Arc<AccountService>,
    pub scores: Arc<ScoreService>,
}

impl State {
    #[must_use]
    pub fn new(services: &AppServices) -> Arc<Self> {
        Arc::new(Self {
            quiz: services.quiz(),
            accounts: services.accounts(),
            scores: services.scores(),
        })
    }
}
