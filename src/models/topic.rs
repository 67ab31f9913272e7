use serde::{Deserialize, Serialize};

use super::TopicId;

/// A unit of learning content.
///
/// Topics are reference data: they are written by the seeder and never
/// changed by user actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    id: TopicId,
    title: String,
    description: String,
    image_ref: i64,
}

impl Topic {
    /// Creates a new topic.
    ///
    /// An `image_ref` of 0 means "use the default image".
    ///
    /// # Examples
    ///
    /// ```
    /// use pathway::{Topic, TopicId};
    ///
    /// let topic = Topic::new(TopicId::new(1), "UI Components", "Widgets and layouts", 0);
    /// assert_eq!(topic.title(), "UI Components");
    /// assert!(topic.uses_default_image());
    /// ```
    pub fn new(
        id: TopicId,
        title: impl Into<String>,
        description: impl Into<String>,
        image_ref: i64,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            image_ref,
        }
    }

    pub fn id(&self) -> TopicId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the image reference, 0 when none is set.
    pub fn image_ref(&self) -> i64 {
        self.image_ref
    }

    /// Returns true when the front end should show its default image.
    pub fn uses_default_image(&self) -> bool {
        self.image_ref <= 0
    }
}
