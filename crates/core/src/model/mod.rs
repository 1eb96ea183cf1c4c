mod generation;
mod ids;
mod question;
mod score;
mod user;

pub use generation::{GenerationRequest, MAX_CANDIDATES, OVER_REQUEST};
pub use ids::{ParseIdError, ScoreId, UserId};
pub use question::Question;
pub use score::{NewScore, ScoreRecord};
pub use user::{NewUser, User, UserError, UserProfile};
