#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{InMemoryRepository, ScoreRepository, Storage, StorageError, UserRepository};
