use super::*;
use pretty_assertions::assert_eq;

fn store() -> LearningStore {
    let db = Database::in_memory().expect("failed to create in-memory database");
    LearningStore::new(db)
}

fn profile(email: &str) -> NewUserProfile {
    NewUserProfile::new("learner", email, crate::hash_password("secret1"), "rust")
}

fn progress_rows(store: &LearningStore, user: UserId, topic: TopicId) -> i64 {
    store
        .database()
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM user_progress WHERE user_id = ?1 AND topic_id = ?2",
            [user.get(), topic.get()],
            |row| row.get(0),
        )
        .expect("failed to count progress rows")
}

// --- Catalog ---

#[test]
fn list_topics_returns_seed_in_insertion_order() {
    let store = store();

    let topics = store.list_topics().expect("failed to list topics");
    let ids: Vec<i64> = topics.iter().map(|t| t.id().get()).collect();

    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    assert_eq!(topics[0].title(), "Introduction to Mobile Development");
    assert!(topics.iter().all(Topic::uses_default_image));
}

#[test]
fn list_topics_on_empty_catalog_is_empty() {
    let store = store();
    store
        .database()
        .connection()
        .execute("DELETE FROM topics", [])
        .unwrap();

    assert!(store.list_topics().unwrap().is_empty());
}

#[test]
fn get_topic_returns_none_for_unknown_id() {
    let store = store();

    assert_eq!(store.get_topic(TopicId::new(42)).unwrap(), None);

    let topic = store
        .get_topic(TopicId::new(4))
        .unwrap()
        .expect("topic 4 should exist");
    assert_eq!(topic.title(), "Data Storage");
}

#[test]
fn study_content_returns_sentinel_when_missing() {
    let store = store();

    assert_eq!(store.study_content(TopicId::new(0)), NO_CONTENT_MESSAGE);
    assert!(
        store
            .study_content(TopicId::new(5))
            .starts_with("API Integration allows")
    );
}

#[test]
fn study_content_degrades_to_sentinel_on_storage_fault() {
    let store = store();
    store
        .database()
        .connection()
        .execute("DROP TABLE study_materials", [])
        .unwrap();

    assert_eq!(store.study_content(TopicId::new(1)), NO_CONTENT_MESSAGE);
}

#[test]
fn questions_for_topic_in_insertion_order() {
    let store = store();

    let questions = store.questions_for_topic(TopicId::new(1)).unwrap();
    let correct: Vec<usize> = questions.iter().map(|q| q.correct_index()).collect();

    assert_eq!(questions.len(), 3);
    assert_eq!(correct, vec![1, 3, 1]);
    assert!(questions.iter().all(|q| q.topic_id() == TopicId::new(1)));
    assert_eq!(questions[1].options()[3], "Sequential");
}

#[test]
fn questions_for_topic_without_seed_is_empty() {
    let store = store();

    assert!(store.questions_for_topic(TopicId::new(3)).unwrap().is_empty());
    assert!(store.questions_for_topic(TopicId::new(77)).unwrap().is_empty());
}

// --- Profiles ---

#[test]
fn create_then_get_returns_profile_with_hash() {
    let store = store();

    let id = store
        .create_user_profile(&profile("ada@example.com"))
        .expect("failed to create profile");
    let fetched = store
        .get_user_by_email("ada@example.com")
        .unwrap()
        .expect("profile should exist");

    assert!(id.get() > 0);
    assert_eq!(fetched.id, id);
    assert_eq!(fetched.password_hash, crate::hash_password("secret1"));
    assert_eq!(fetched.interests, "rust");
    assert!(fetched.created_at.is_some());
}

#[test]
fn create_with_duplicate_email_fails() {
    let store = store();

    store.create_user_profile(&profile("ada@example.com")).unwrap();
    let second = store.create_user_profile(&profile("ada@example.com"));

    match second {
        Err(StoreError::DuplicateEmail(email)) => assert_eq!(email, "ada@example.com"),
        other => panic!("expected DuplicateEmail, got {other:?}"),
    }
}

#[test]
fn get_user_by_email_returns_none_for_unknown() {
    let store = store();

    assert_eq!(store.get_user_by_email("nobody@example.com").unwrap(), None);
    assert_eq!(store.get_user(UserId::new(12)).unwrap(), None);
}

#[test]
fn update_user_profile_changes_editable_fields() {
    let store = store();
    let id = store.create_user_profile(&profile("ada@example.com")).unwrap();

    assert!(store.update_user_profile(id, "Ada L.", "math, poetry").unwrap());
    assert!(!store.update_user_profile(UserId::new(999), "x", "y").unwrap());

    let updated = store.get_user(id).unwrap().unwrap();
    assert_eq!(updated.username, "Ada L.");
    assert_eq!(updated.interests, "math, poetry");
    assert_eq!(updated.email, "ada@example.com");
}

#[test]
fn delete_user_removes_profile_and_progress() {
    let store = store();
    let id = store.create_user_profile(&profile("ada@example.com")).unwrap();
    store.mark_topic_completed(id, TopicId::new(1), 66).unwrap();
    store.mark_topic_completed(id, TopicId::new(2), 100).unwrap();

    assert!(store.delete_user_by_email("ada@example.com").unwrap());

    assert_eq!(store.get_user_by_email("ada@example.com").unwrap(), None);
    for topic in 1..=5 {
        assert!(!store.is_topic_completed(id, TopicId::new(topic)).unwrap());
    }
    assert_eq!(store.completed_topics_count(id).unwrap(), 0);
}

#[test]
fn delete_user_leaves_other_users_alone() {
    let store = store();
    let ada = store.create_user_profile(&profile("ada@example.com")).unwrap();
    let bob = store.create_user_profile(&profile("bob@example.com")).unwrap();
    store.mark_topic_completed(ada, TopicId::new(1), 50).unwrap();
    store.mark_topic_completed(bob, TopicId::new(1), 80).unwrap();

    store.delete_user_by_email("ada@example.com").unwrap();

    assert!(store.get_user(bob).unwrap().is_some());
    assert_eq!(store.assessment_score(bob, TopicId::new(1)).unwrap(), 80);
}

#[test]
fn delete_unknown_user_returns_false_without_side_effects() {
    let store = store();
    let id = store.create_user_profile(&profile("ada@example.com")).unwrap();
    store.mark_topic_completed(id, TopicId::new(1), 70).unwrap();

    assert!(!store.delete_user_by_email("ghost@example.com").unwrap());

    assert!(store.get_user(id).unwrap().is_some());
    assert!(store.is_topic_completed(id, TopicId::new(1)).unwrap());
}

// --- Progress ---

#[test]
fn mark_topic_completed_twice_keeps_one_row_with_latest_score() {
    let store = store();
    let (user, topic) = (UserId::new(3), TopicId::new(2));

    store.mark_topic_completed(user, topic, 33).unwrap();
    store.mark_topic_completed(user, topic, 100).unwrap();

    assert_eq!(progress_rows(&store, user, topic), 1);
    assert_eq!(store.assessment_score(user, topic).unwrap(), 100);
    assert!(store.is_topic_completed(user, topic).unwrap());
}

#[test]
fn mark_topic_completed_can_lower_score() {
    let store = store();
    let (user, topic) = (UserId::new(1), TopicId::new(1));

    store.mark_topic_completed(user, topic, 90).unwrap();
    store.mark_topic_completed(user, topic, 10).unwrap();

    assert_eq!(store.assessment_score(user, topic).unwrap(), 10);
}

#[test]
fn mark_topic_completed_clamps_score() {
    let store = store();
    let (user, topic) = (UserId::new(1), TopicId::new(1));

    store.mark_topic_completed(user, topic, 250).unwrap();

    assert_eq!(store.assessment_score(user, topic).unwrap(), 100);
}

#[test]
fn absent_progress_reads_as_zero_and_false() {
    let store = store();
    let (user, topic) = (UserId::new(9), TopicId::new(4));

    assert!(!store.is_topic_completed(user, topic).unwrap());
    assert_eq!(store.assessment_score(user, topic).unwrap(), 0);
    assert_eq!(store.completed_topics_count(user).unwrap(), 0);
}

#[test]
fn progress_is_tracked_per_user() {
    let store = store();
    let topic = TopicId::new(1);

    store.mark_topic_completed(UserId::new(1), topic, 70).unwrap();

    assert!(store.is_topic_completed(UserId::new(1), topic).unwrap());
    assert!(!store.is_topic_completed(UserId::new(2), topic).unwrap());
}

#[test]
fn overall_progress_with_zero_topics_is_zero() {
    let store = store();
    store
        .mark_topic_completed(UserId::new(1), TopicId::new(1), 50)
        .unwrap();

    assert_eq!(store.overall_progress(UserId::new(1), 0).unwrap(), 0.0);
    assert_eq!(store.overall_progress(UserId::new(2), 0).unwrap(), 0.0);
}

#[test]
fn overall_progress_is_percentage_of_total() {
    let store = store();
    let user = UserId::new(1);
    store.mark_topic_completed(user, TopicId::new(1), 50).unwrap();
    store.mark_topic_completed(user, TopicId::new(2), 80).unwrap();

    assert_eq!(store.completed_topics_count(user).unwrap(), 2);
    assert_eq!(store.overall_progress(user, 5).unwrap(), 40.0);
    assert_eq!(store.overall_progress(user, 4).unwrap(), 50.0);
}

#[test]
fn progress_for_user_lists_rows_by_topic() {
    let store = store();
    let user = UserId::new(1);
    store.mark_topic_completed(user, TopicId::new(3), 20).unwrap();
    store.mark_topic_completed(user, TopicId::new(1), 100).unwrap();
    store
        .mark_topic_completed(UserId::new(2), TopicId::new(2), 60)
        .unwrap();

    let progress = store.progress_for_user(user).unwrap();
    let summary: Vec<(i64, u8)> = progress
        .iter()
        .map(|p| (p.topic_id.get(), p.score))
        .collect();

    assert_eq!(summary, vec![(1, 100), (3, 20)]);
    assert!(progress.iter().all(|p| p.completed && p.completed_at.is_some()));
}
