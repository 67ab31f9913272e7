mod ids;
mod profile;
mod progress;
mod question;
mod topic;

pub use ids::{QuestionId, TopicId, UserId};
pub use profile::{NewUserProfile, UserProfile};
pub use progress::UserProgress;
pub use question::{AssessmentQuestion, OPTION_COUNT};
pub use topic::Topic;
