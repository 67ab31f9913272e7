pub mod account;
pub mod assessment;
pub mod config;
pub mod db;
pub mod doctor;
pub mod error;
pub mod models;
pub mod prefs;
pub mod service;

pub use account::hash_password;
pub use db::Database;
pub use error::{QuestionError, StoreError};
pub use models::{
    AssessmentQuestion, NewUserProfile, OPTION_COUNT, QuestionId, Topic, TopicId, UserId,
    UserProfile, UserProgress,
};
pub use service::{LearningStore, NO_CONTENT_MESSAGE};
