#![forbid(unsafe_code)]

pub mod api;
pub mod model;
pub mod recency;
pub mod refresh;
pub mod similarity;
pub mod time;

pub use recency::{InMemoryRecencyStore, RecencyStore, TopicHistory};
pub use similarity::SimilarityFilter;
pub use time::Clock;
