#![forbid(unsafe_code)]

pub mod api;
pub mod error;
pub mod history;
pub mod kv;
pub mod page;
pub mod session;

pub use api::{HttpQuizApi, QuizApi};
pub use error::{ClientError, KvError};
pub use history::ClientHistory;
pub use kv::{FileKvStore, KeyValueStore, MemoryKvStore};
pub use page::{Category, PageState, QuizPage};
pub use session::Session;
