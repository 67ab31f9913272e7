//! Built-in reference data: topics, study material and assessment questions.
//!
//! Reference tables carry their own version in `PRAGMA user_version`. When the
//! compiled [`SEED_VERSION`] is newer than the stored one, the three reference
//! tables are rewritten in one transaction. User tables are left alone.

use anyhow::Result;
use rusqlite::{Connection, params};

use crate::{Topic, TopicId};

/// Version of the reference data compiled into this build.
pub const SEED_VERSION: u32 = 1;

struct SeedTopic {
    id: i64,
    title: &'static str,
    description: &'static str,
}

struct SeedQuestion {
    topic_id: i64,
    text: &'static str,
    options: [&'static str; 4],
    correct: u8,
}

const TOPICS: &[SeedTopic] = &[
    SeedTopic {
        id: 1,
        title: "Introduction to Mobile Development",
        description: "Learn the basics of mobile app development",
    },
    SeedTopic {
        id: 2,
        title: "UI Components",
        description: "Explore various UI components in Android",
    },
    SeedTopic {
        id: 3,
        title: "User Authentication",
        description: "Implement secure user authentication",
    },
    SeedTopic {
        id: 4,
        title: "Data Storage",
        description: "Discover options for storing data in Android apps",
    },
    SeedTopic {
        id: 5,
        title: "API Integration",
        description: "Connect your app with external APIs",
    },
];

const STUDY_MATERIALS: &[(i64, &str)] = &[
    (
        1,
        "Mobile development is the process of creating applications that run on mobile devices.\n\n\
         Key concepts in mobile development:\n\
         \u{2022} Native vs hybrid vs web apps\n\
         \u{2022} Platform-specific considerations\n\
         \u{2022} User interface design\n\
         \u{2022} Performance optimization\n\
         \u{2022} Device feature utilization\n\n\
         Android is an open-source mobile operating system developed by Google. \
         Android applications are primarily written in Java or Kotlin and use XML for layouts.",
    ),
    (
        2,
        "Android UI Components are the building blocks for creating user interfaces.\n\n\
         Essential UI Components include:\n\
         \u{2022} TextView: Displays text to the user\n\
         \u{2022} EditText: Allows user input\n\
         \u{2022} Button: Triggers actions when clicked\n\
         \u{2022} ImageView: Displays images\n\
         \u{2022} RecyclerView: Efficiently displays scrollable lists\n\
         \u{2022} CardView: Material design container with shadow\n\n\
         Layouts are used to arrange UI components on the screen, including LinearLayout, \
         RelativeLayout, ConstraintLayout, etc.",
    ),
    (
        3,
        "User authentication is the process of verifying a user's identity.\n\n\
         Common authentication methods:\n\
         \u{2022} Username/password\n\
         \u{2022} OAuth 2.0\n\
         \u{2022} Firebase Authentication\n\
         \u{2022} Biometric authentication\n\n\
         Best practices for authentication:\n\
         \u{2022} Never store passwords in plain text\n\
         \u{2022} Use secure tokens for sessions\n\
         \u{2022} Implement proper error handling\n\
         \u{2022} Provide account recovery options",
    ),
    (
        4,
        "Android provides several options for storing data locally on the device.\n\n\
         Data storage options:\n\
         \u{2022} Shared Preferences: Store primitive data in key-value pairs\n\
         \u{2022} Internal Storage: Store private data on the device's filesystem\n\
         \u{2022} External Storage: Store public data on shared external storage\n\
         \u{2022} SQLite Database: Store structured data in a local database\n\
         \u{2022} Room: A persistence library providing an abstraction layer over SQLite\n\n\
         The choice of storage method depends on the app's specific requirements.",
    ),
    (
        5,
        "API Integration allows your app to communicate with external services.\n\n\
         Key concepts in API Integration:\n\
         \u{2022} RESTful APIs: HTTP-based communication with standard methods\n\
         \u{2022} JSON/XML parsing: Converting structured data to objects\n\
         \u{2022} Authentication: Securing API requests\n\
         \u{2022} Error handling: Managing network issues and API errors\n\n\
         Common libraries for API integration in Android:\n\
         \u{2022} Retrofit: Type-safe HTTP client\n\
         \u{2022} OkHttp: HTTP client for efficient requests\n\
         \u{2022} Volley: Google's HTTP library\n\
         \u{2022} Gson/Jackson: JSON parsing libraries",
    ),
];

// Only topics 1 and 2 ship with questions; the rest rely on the session fallback.
const QUESTIONS: &[SeedQuestion] = &[
    SeedQuestion {
        topic_id: 1,
        text: "What is the primary programming language for Android development?",
        options: ["Swift", "Java/Kotlin", "C#", "JavaScript"],
        correct: 1,
    },
    SeedQuestion {
        topic_id: 1,
        text: "Which of the following is NOT a mobile app development approach?",
        options: ["Native", "Hybrid", "Web", "Sequential"],
        correct: 3,
    },
    SeedQuestion {
        topic_id: 1,
        text: "What file format is used for Android layouts?",
        options: ["JSON", "XML", "HTML", "CSS"],
        correct: 1,
    },
    SeedQuestion {
        topic_id: 2,
        text: "Which component is used to display scrollable lists in Android?",
        options: ["TextView", "ScrollView", "RecyclerView", "ListView"],
        correct: 2,
    },
    SeedQuestion {
        topic_id: 2,
        text: "Which layout positions elements relative to each other?",
        options: [
            "LinearLayout",
            "RelativeLayout",
            "ConstraintLayout",
            "FrameLayout",
        ],
        correct: 1,
    },
    SeedQuestion {
        topic_id: 2,
        text: "What is the purpose of a CardView?",
        options: [
            "To display images",
            "To show notification cards",
            "To create material design containers with shadows",
            "To render video content",
        ],
        correct: 2,
    },
];

/// Returns the built-in topic list.
///
/// Front ends show these when the stored catalog comes back empty.
pub fn builtin_topics() -> Vec<Topic> {
    TOPICS
        .iter()
        .map(|topic| Topic::new(TopicId::new(topic.id), topic.title, topic.description, 0))
        .collect()
}

/// Reads the reference data version stored in the database.
pub fn stored_seed_version(conn: &Connection) -> Result<u32> {
    let version: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

/// Rewrites the reference tables when the stored seed version is outdated.
///
/// Returns true if the tables were rewritten.
pub fn reseed_if_outdated(conn: &mut Connection) -> Result<bool> {
    let stored = stored_seed_version(conn)?;
    if stored >= SEED_VERSION {
        return Ok(false);
    }

    let tx = conn.transaction()?;

    tx.execute("DELETE FROM assessment_questions", [])?;
    tx.execute("DELETE FROM study_materials", [])?;
    tx.execute("DELETE FROM topics", [])?;

    for topic in TOPICS {
        tx.execute(
            "INSERT INTO topics (id, title, description, image_ref) VALUES (?1, ?2, ?3, 0)",
            params![topic.id, topic.title, topic.description],
        )?;
    }

    for (topic_id, content) in STUDY_MATERIALS {
        tx.execute(
            "INSERT INTO study_materials (topic_id, content) VALUES (?1, ?2)",
            params![topic_id, content],
        )?;
    }

    for question in QUESTIONS {
        let [a, b, c, d] = question.options;
        tx.execute(
            "INSERT INTO assessment_questions
             (topic_id, question_text, option_a, option_b, option_c, option_d, correct_option)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![question.topic_id, question.text, a, b, c, d, question.correct],
        )?;
    }

    tx.pragma_update(None, "user_version", SEED_VERSION)?;
    tx.commit()?;

    tracing::info!(
        from = stored,
        to = SEED_VERSION,
        topics = TOPICS.len(),
        questions = QUESTIONS.len(),
        "Seeded reference data"
    );

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_topics_match_seeded_topics() {
        let topics = builtin_topics();

        assert_eq!(topics.len(), TOPICS.len());
        assert_eq!(topics[0].title(), "Introduction to Mobile Development");
        assert!(topics.iter().all(Topic::uses_default_image));
    }

    #[test]
    fn seed_covers_every_topic_with_material() {
        for topic in TOPICS {
            assert!(
                STUDY_MATERIALS.iter().any(|(id, _)| *id == topic.id),
                "topic {} has no study material",
                topic.id
            );
        }
    }

    #[test]
    fn seed_questions_have_valid_answers() {
        for question in QUESTIONS {
            assert!(usize::from(question.correct) < question.options.len());
            assert!(TOPICS.iter().any(|t| t.id == question.topic_id));
        }
    }

    #[test]
    fn only_first_two_topics_have_questions() {
        let mut topic_ids: Vec<i64> = QUESTIONS.iter().map(|q| q.topic_id).collect();
        topic_ids.dedup();
        assert_eq!(topic_ids, vec![1, 2]);
    }
}
