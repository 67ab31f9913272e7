//! Assessment sessions: one topic's quiz from first question to stored score.
//!
//! A session loads its questions once, presents them in order, scores each
//! answer by option position and, after the last answer, performs two writes:
//! the store's progress upsert (authoritative) and the completion cache
//! (best-effort). A failed store write is reported but the session still ends
//! in the finished state.

mod fallback;

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::{AssessmentQuestion, LearningStore, StoreError, TopicId, UserId};

pub use fallback::fallback_questions;

/// Errors returned when an answer cannot be accepted.
///
/// The session state is unchanged after any of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No option was selected. The caller should prompt again.
    #[error("please select an answer")]
    NoSelection,

    #[error("option {selected} does not exist, question has {options} options")]
    SelectionOutOfRange { selected: usize, options: usize },

    #[error("assessment is already finished")]
    AlreadyFinished,
}

/// Local cache of completed topics, updated after the store write.
///
/// Implementations should be cheap; failures are logged and otherwise ignored.
pub trait CompletionCache {
    fn record_completion(&mut self, topic_id: TopicId, percentage: u8) -> anyhow::Result<()>;
}

/// Where a session's questions came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
    Stored,
    Fallback,
}

/// Qualitative band for a percentage score. Lower bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// 80 and above
    Excellent,
    /// 60 to 79
    Good,
    /// Below 60
    #[serde(rename = "needs review")]
    NeedsReview,
}

impl Tier {
    pub fn from_percentage(percentage: u8) -> Self {
        match percentage {
            80.. => Tier::Excellent,
            60..=79 => Tier::Good,
            _ => Tier::NeedsReview,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Excellent => "excellent",
            Tier::Good => "good",
            Tier::NeedsReview => "needs review",
        }
    }

    /// Message shown to the learner on the result screen.
    pub fn message(self) -> &'static str {
        match self {
            Tier::Excellent => "Excellent work! You've mastered this topic.",
            Tier::Good => "Good job! You understand most of the material.",
            Tier::NeedsReview => "You might want to review this topic again.",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Converts a raw score to a percentage, truncating toward zero.
///
/// # Examples
///
/// ```
/// use pathway::assessment::percentage;
///
/// assert_eq!(percentage(2, 3), 66);
/// assert_eq!(percentage(3, 3), 100);
/// assert_eq!(percentage(0, 0), 0);
/// ```
pub fn percentage(correct: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = u64::from(correct.min(total)) * 100 / u64::from(total);
    // correct <= total keeps this within 0..=100
    pct as u8
}

/// Final score of a finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssessmentResult {
    pub topic_id: TopicId,
    pub correct: u32,
    pub total: u32,
    pub percentage: u8,
    pub tier: Tier,
}

/// Outcome of the writes performed when a session finishes.
#[derive(Debug)]
pub struct CompletionReport {
    pub result: AssessmentResult,
    /// Set when the progress upsert failed. The result is still final.
    pub store_error: Option<StoreError>,
    /// False when the completion cache could not be updated.
    pub cache_synced: bool,
}

impl CompletionReport {
    /// Returns true if the authoritative store write succeeded.
    pub fn is_saved(&self) -> bool {
        self.store_error.is_none()
    }
}

/// Result of accepting one answer.
#[derive(Debug)]
pub enum AnswerOutcome {
    /// Moved on to the question at `index`.
    Next { correct: bool, index: usize },
    /// That was the last question.
    Finished {
        correct: bool,
        report: CompletionReport,
    },
}

#[derive(Debug, Clone)]
enum SessionState {
    Presenting(usize),
    Finished(AssessmentResult),
}

/// A single run through one topic's questions.
///
/// # Examples
///
/// ```
/// use pathway::assessment::{AnswerOutcome, AssessmentSession, CompletionCache};
/// use pathway::{Database, LearningStore, TopicId, UserId};
///
/// struct NoCache;
/// impl CompletionCache for NoCache {
///     fn record_completion(&mut self, _: TopicId, _: u8) -> anyhow::Result<()> {
///         Ok(())
///     }
/// }
///
/// # fn main() -> anyhow::Result<()> {
/// let store = LearningStore::new(Database::in_memory()?);
/// let mut cache = NoCache;
/// let mut session = AssessmentSession::start(&store, &mut cache, UserId::new(1), TopicId::new(1));
///
/// session.submit_answer(Some(1))?;
/// session.submit_answer(Some(3))?;
/// let outcome = session.submit_answer(Some(0))?;
///
/// let AnswerOutcome::Finished { report, .. } = outcome else { unreachable!() };
/// assert_eq!(report.result.percentage, 66);
/// assert!(store.is_topic_completed(UserId::new(1), TopicId::new(1))?);
/// # Ok(())
/// # }
/// ```
pub struct AssessmentSession<'a> {
    store: &'a LearningStore,
    cache: &'a mut dyn CompletionCache,
    user_id: UserId,
    topic_id: TopicId,
    questions: Vec<AssessmentQuestion>,
    source: QuestionSource,
    score: u32,
    state: SessionState,
}

impl<'a> AssessmentSession<'a> {
    /// Loads the questions for `topic_id` and presents the first one.
    ///
    /// Falls back to the built-in set when the store returns no questions or
    /// fails, so a session always has at least one question.
    pub fn start(
        store: &'a LearningStore,
        cache: &'a mut dyn CompletionCache,
        user_id: UserId,
        topic_id: TopicId,
    ) -> Self {
        let (questions, source) = match store.questions_for_topic(topic_id) {
            Ok(questions) if !questions.is_empty() => (questions, QuestionSource::Stored),
            Ok(_) => (fallback_questions(topic_id), QuestionSource::Fallback),
            Err(e) => {
                tracing::warn!(
                    topic_id = topic_id.get(),
                    error = %e,
                    "Failed to load questions, using built-in set"
                );
                (fallback_questions(topic_id), QuestionSource::Fallback)
            }
        };

        tracing::debug!(
            user_id = user_id.get(),
            topic_id = topic_id.get(),
            questions = questions.len(),
            ?source,
            "Assessment started"
        );

        Self {
            store,
            cache,
            user_id,
            topic_id,
            questions,
            source,
            score: 0,
            state: SessionState::Presenting(0),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn topic_id(&self) -> TopicId {
        self.topic_id
    }

    pub fn question_source(&self) -> QuestionSource {
        self.source
    }

    pub fn questions(&self) -> &[AssessmentQuestion] {
        &self.questions
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Number of correct answers so far.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Index of the question being presented, or `total()` once finished.
    pub fn current_index(&self) -> usize {
        match self.state {
            SessionState::Presenting(index) => index,
            SessionState::Finished(_) => self.questions.len(),
        }
    }

    /// The question awaiting an answer, `None` once finished.
    pub fn current_question(&self) -> Option<&AssessmentQuestion> {
        match self.state {
            SessionState::Presenting(index) => self.questions.get(index),
            SessionState::Finished(_) => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Finished(_))
    }

    pub fn result(&self) -> Option<&AssessmentResult> {
        match &self.state {
            SessionState::Finished(result) => Some(result),
            SessionState::Presenting(_) => None,
        }
    }

    /// Scores the selected option for the current question and advances.
    ///
    /// `None` means nothing was selected and is rejected without changing
    /// the session. Answering the last question finishes the session and
    /// performs the completion writes.
    pub fn submit_answer(&mut self, selection: Option<usize>) -> Result<AnswerOutcome, SessionError> {
        let index = match self.state {
            SessionState::Presenting(index) => index,
            SessionState::Finished(_) => return Err(SessionError::AlreadyFinished),
        };

        let selected = selection.ok_or(SessionError::NoSelection)?;
        let question = &self.questions[index];
        if selected >= question.options().len() {
            return Err(SessionError::SelectionOutOfRange {
                selected,
                options: question.options().len(),
            });
        }

        let correct = question.is_correct(selected);
        if correct {
            self.score += 1;
        }

        let next = index + 1;
        if next < self.questions.len() {
            self.state = SessionState::Presenting(next);
            return Ok(AnswerOutcome::Next {
                correct,
                index: next,
            });
        }

        let report = self.finish();
        Ok(AnswerOutcome::Finished { correct, report })
    }

    fn finish(&mut self) -> CompletionReport {
        let total = self.questions.len() as u32;
        let pct = percentage(self.score, total);
        let result = AssessmentResult {
            topic_id: self.topic_id,
            correct: self.score,
            total,
            percentage: pct,
            tier: Tier::from_percentage(pct),
        };
        self.state = SessionState::Finished(result.clone());

        let store_error = self
            .store
            .mark_topic_completed(self.user_id, self.topic_id, pct)
            .err();
        if let Some(e) = &store_error {
            tracing::error!(
                user_id = self.user_id.get(),
                topic_id = self.topic_id.get(),
                error = %e,
                "Failed to save assessment result"
            );
        }

        let cache_synced = match self.cache.record_completion(self.topic_id, pct) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    topic_id = self.topic_id.get(),
                    error = %e,
                    "Failed to update completion cache"
                );
                false
            }
        };

        tracing::debug!(
            topic_id = self.topic_id.get(),
            percentage = pct,
            tier = %result.tier,
            "Assessment finished"
        );

        CompletionReport {
            result,
            store_error,
            cache_synced,
        }
    }
}
