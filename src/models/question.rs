use serde::{Deserialize, Serialize};

use super::{QuestionId, TopicId};
use crate::error::QuestionError;

/// Number of answer options every question carries.
pub const OPTION_COUNT: usize = 4;

/// A multiple-choice question belonging to one topic.
///
/// Holds exactly [`OPTION_COUNT`] options and the zero-based position of the
/// correct one. The position is validated on construction, so
/// `correct_index() < options().len()` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentQuestion {
    id: QuestionId,
    topic_id: TopicId,
    text: String,
    options: [String; OPTION_COUNT],
    correct_index: usize,
}

impl AssessmentQuestion {
    /// Creates a question, rejecting an out-of-range correct index.
    ///
    /// # Examples
    ///
    /// ```
    /// use pathway::{AssessmentQuestion, QuestionId, TopicId};
    ///
    /// let question = AssessmentQuestion::new(
    ///     QuestionId::new(1),
    ///     TopicId::new(1),
    ///     "What file format is used for Android layouts?",
    ///     ["JSON", "XML", "HTML", "CSS"].map(String::from),
    ///     1,
    /// )?;
    /// assert!(question.is_correct(1));
    ///
    /// let invalid = AssessmentQuestion::new(
    ///     QuestionId::new(2),
    ///     TopicId::new(1),
    ///     "Broken",
    ///     ["a", "b", "c", "d"].map(String::from),
    ///     4,
    /// );
    /// assert!(invalid.is_err());
    /// # Ok::<(), pathway::QuestionError>(())
    /// ```
    pub fn new(
        id: QuestionId,
        topic_id: TopicId,
        text: impl Into<String>,
        options: [String; OPTION_COUNT],
        correct_index: usize,
    ) -> Result<Self, QuestionError> {
        if correct_index >= options.len() {
            return Err(QuestionError::CorrectIndexOutOfRange {
                index: correct_index,
                options: options.len(),
            });
        }

        Ok(Self {
            id,
            topic_id,
            text: text.into(),
            options,
            correct_index,
        })
    }

    pub fn id(&self) -> QuestionId {
        self.id
    }

    pub fn topic_id(&self) -> TopicId {
        self.topic_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    /// Checks a selected option by position. Option text is never compared.
    pub fn is_correct(&self, selected: usize) -> bool {
        selected == self.correct_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> [String; OPTION_COUNT] {
        ["Native", "Hybrid", "Web", "Sequential"].map(String::from)
    }

    #[test]
    fn new_accepts_last_option_as_correct() {
        let question =
            AssessmentQuestion::new(QuestionId::new(1), TopicId::new(1), "Q", options(), 3)
                .unwrap();

        assert_eq!(question.correct_index(), 3);
        assert_eq!(question.options().len(), OPTION_COUNT);
        assert_eq!(question.text(), "Q");
    }

    #[test]
    fn new_rejects_index_past_options() {
        let err = AssessmentQuestion::new(QuestionId::new(1), TopicId::new(1), "Q", options(), 4)
            .unwrap_err();

        assert_eq!(
            err,
            QuestionError::CorrectIndexOutOfRange {
                index: 4,
                options: 4
            }
        );
    }

    #[test]
    fn is_correct_compares_positions() {
        let mut opts = options();
        opts[2] = "Native".to_string();
        let question =
            AssessmentQuestion::new(QuestionId::new(1), TopicId::new(1), "Q", opts, 0).unwrap();

        // Same text at another position does not count.
        assert!(question.is_correct(0));
        assert!(!question.is_correct(2));
    }
}
