#![forbid(unsafe_code)]

pub mod account_service;
pub mod app_services;
pub mod completion;
pub mod error;
pub mod question_source;
pub mod quiz_service;
pub mod score_service;

pub use quiz_core::Clock;

pub use account_service::AccountService;
pub use app_services::AppServices;
pub use completion::{CompletionClient, CompletionConfig, CompletionPrompt, OpenAiCompletionClient};
pub use error::{AccountError, AppServicesError, CompletionError, ScoreServiceError};
pub use question_source::{GenerationOutcome, QuestionSource};
pub use quiz_service::QuizService;
pub use score_service::ScoreService;
