use crate::{AssessmentQuestion, QuestionId, TopicId};

type FallbackEntry = (i64, &'static str, [&'static str; 4], usize);

const MOBILE_DEVELOPMENT: &[FallbackEntry] = &[
    (
        1,
        "What is the primary programming language for Android development?",
        ["Swift", "Java/Kotlin", "C#", "JavaScript"],
        1,
    ),
    (
        2,
        "Which of the following is NOT a mobile app development approach?",
        ["Native", "Hybrid", "Web", "Sequential"],
        3,
    ),
    (
        3,
        "What file format is used for Android layouts?",
        ["JSON", "XML", "HTML", "CSS"],
        1,
    ),
];

const UI_COMPONENTS: &[FallbackEntry] = &[
    (
        4,
        "Which component is used to display scrollable lists in Android?",
        ["TextView", "ScrollView", "RecyclerView", "ListView"],
        2,
    ),
    (
        5,
        "Which layout positions elements relative to each other?",
        [
            "LinearLayout",
            "RelativeLayout",
            "ConstraintLayout",
            "FrameLayout",
        ],
        1,
    ),
    (
        6,
        "What is the purpose of a CardView?",
        [
            "To display images",
            "To show notification cards",
            "To create material design containers with shadows",
            "To render video content",
        ],
        2,
    ),
];

const GENERIC: &[FallbackEntry] = &[
    (
        7,
        "What does API stand for?",
        [
            "Application Programming Interface",
            "Android Programming Interface",
            "Application Process Integration",
            "Automated Programming Interface",
        ],
        0,
    ),
    (
        8,
        "Which of the following is a way to store data in Android?",
        ["SharedPreferences", "DataStorage", "AndroidCache", "MemoryBuffer"],
        0,
    ),
    (
        9,
        "What is the entry point of an Android app?",
        ["MainActivity", "StartActivity", "LauncherActivity", "InitActivity"],
        0,
    ),
];

/// Returns the built-in questions used when the store has none for a topic.
///
/// Topics 1 and 2 have their own sets; every other ID gets the generic set.
/// The result is never empty.
pub fn fallback_questions(topic_id: TopicId) -> Vec<AssessmentQuestion> {
    let entries = match topic_id.get() {
        1 => MOBILE_DEVELOPMENT,
        2 => UI_COMPONENTS,
        _ => GENERIC,
    };

    entries
        .iter()
        .filter_map(|&(id, text, options, correct)| {
            AssessmentQuestion::new(
                QuestionId::new(id),
                topic_id,
                text,
                options.map(String::from),
                correct,
            )
            .ok()
        })
        .collect()
}
