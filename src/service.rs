use rusqlite::{OptionalExtension, Row, params};
use time::OffsetDateTime;

use crate::{
    AssessmentQuestion, Database, NewUserProfile, QuestionId, StoreError, Topic, TopicId,
    UserId, UserProfile, UserProgress,
};

/// Text returned by [`LearningStore::study_content`] when a topic has no material.
pub const NO_CONTENT_MESSAGE: &str = "No content available for this topic.";

type StoreResult<T> = Result<T, StoreError>;

/// Catalog and progress store.
///
/// LearningStore owns a Database instance and is the only component that
/// reads or writes the five learning tables. It assigns identities and
/// enforces the one-profile-per-email and one-progress-row-per-pair rules.
/// Absent records come back as `None`, empty vectors or sentinel values;
/// only constraint violations and engine failures are errors.
///
/// # Examples
///
/// ```
/// use pathway::{Database, LearningStore};
///
/// # fn main() -> anyhow::Result<()> {
/// let db = Database::in_memory()?;
/// let store = LearningStore::new(db);
/// assert_eq!(store.list_topics()?.len(), 5);
/// # Ok(())
/// # }
/// ```
pub struct LearningStore {
    db: Database,
}

impl LearningStore {
    /// Creates a new LearningStore with the given database.
    ///
    /// Takes ownership of the database instance.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Returns a reference to the underlying database.
    ///
    /// Useful for testing or diagnostics that need direct database access.
    pub fn database(&self) -> &Database {
        &self.db
    }

    // --- Catalog ---

    /// Lists all topics in insertion order.
    ///
    /// An empty list is valid; the front end decides what to show instead.
    pub fn list_topics(&self) -> StoreResult<Vec<Topic>> {
        let conn = self.db.connection();
        let mut stmt =
            conn.prepare("SELECT id, title, description, image_ref FROM topics ORDER BY id")?;

        let topics = stmt
            .query_map([], topic_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(topics)
    }

    /// Retrieves a topic by its ID.
    ///
    /// Returns `None` if no topic exists with the given ID.
    pub fn get_topic(&self, id: TopicId) -> StoreResult<Option<Topic>> {
        let topic = self
            .db
            .connection()
            .query_row(
                "SELECT id, title, description, image_ref FROM topics WHERE id = ?1",
                [id.get()],
                topic_from_row,
            )
            .optional()?;

        Ok(topic)
    }

    /// Returns the study material for a topic.
    ///
    /// Never fails: a missing row or a storage error both yield
    /// [`NO_CONTENT_MESSAGE`].
    ///
    /// # Examples
    ///
    /// ```
    /// use pathway::{Database, LearningStore, TopicId, NO_CONTENT_MESSAGE};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let store = LearningStore::new(Database::in_memory()?);
    ///
    /// assert!(store.study_content(TopicId::new(1)).contains("Mobile development"));
    /// assert_eq!(store.study_content(TopicId::new(99)), NO_CONTENT_MESSAGE);
    /// # Ok(())
    /// # }
    /// ```
    pub fn study_content(&self, topic_id: TopicId) -> String {
        let result: rusqlite::Result<Option<String>> = self
            .db
            .connection()
            .query_row(
                "SELECT content FROM study_materials WHERE topic_id = ?1",
                [topic_id.get()],
                |row| row.get(0),
            )
            .optional();

        match result {
            Ok(Some(content)) => content,
            Ok(None) => NO_CONTENT_MESSAGE.to_string(),
            Err(e) => {
                tracing::warn!(topic_id = topic_id.get(), error = %e, "Failed to read study material");
                NO_CONTENT_MESSAGE.to_string()
            }
        }
    }

    /// Returns all questions for a topic in insertion order.
    ///
    /// Topics without seeded questions return an empty vector.
    pub fn questions_for_topic(&self, topic_id: TopicId) -> StoreResult<Vec<AssessmentQuestion>> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare(
            "SELECT id, topic_id, question_text, option_a, option_b, option_c, option_d, correct_option
             FROM assessment_questions
             WHERE topic_id = ?1
             ORDER BY id",
        )?;

        let rows = stmt.query_map([topic_id.get()], |row| {
            let id: i64 = row.get(0)?;
            let topic_id: i64 = row.get(1)?;
            let text: String = row.get(2)?;
            let options: [String; 4] = [row.get(3)?, row.get(4)?, row.get(5)?, row.get(6)?];
            let correct: i64 = row.get(7)?;
            Ok((id, topic_id, text, options, correct))
        })?;

        let mut questions = Vec::new();
        for row_result in rows {
            let (id, topic_id, text, options, correct) = row_result?;

            let correct = usize::try_from(correct).map_err(|_| StoreError::InvalidRecord {
                table: "assessment_questions",
                reason: format!("question {id} has negative correct_option {correct}"),
            })?;

            let question = AssessmentQuestion::new(
                QuestionId::new(id),
                TopicId::new(topic_id),
                text,
                options,
                correct,
            )
            .map_err(|e| StoreError::InvalidRecord {
                table: "assessment_questions",
                reason: format!("question {id}: {e}"),
            })?;

            questions.push(question);
        }

        Ok(questions)
    }

    // --- Profiles ---

    /// Creates a user profile and returns its positive ID.
    ///
    /// Fails with [`StoreError::DuplicateEmail`] if a profile with the same
    /// email already exists. The uniqueness check is the table's UNIQUE
    /// constraint, so concurrent sign-ups cannot both succeed.
    ///
    /// # Examples
    ///
    /// ```
    /// use pathway::{Database, LearningStore, NewUserProfile, StoreError};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let store = LearningStore::new(Database::in_memory()?);
    /// let profile = NewUserProfile::new("ada", "ada@example.com", "hash", "");
    ///
    /// let id = store.create_user_profile(&profile)?;
    /// assert!(id.get() > 0);
    ///
    /// let again = store.create_user_profile(&profile);
    /// assert!(matches!(again, Err(StoreError::DuplicateEmail(_))));
    /// # Ok(())
    /// # }
    /// ```
    pub fn create_user_profile(&self, profile: &NewUserProfile) -> StoreResult<UserId> {
        let conn = self.db.connection();
        let now = OffsetDateTime::now_utc().unix_timestamp();

        let result = conn.execute(
            "INSERT INTO user_profiles (username, email, password_hash, interests, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                profile.username,
                profile.email,
                profile.password_hash,
                profile.interests,
                now
            ],
        );

        match result {
            Ok(_) => Ok(UserId::new(conn.last_insert_rowid())),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Err(StoreError::DuplicateEmail(profile.email.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Looks up a profile by email. Returns `None` if no profile matches.
    pub fn get_user_by_email(&self, email: &str) -> StoreResult<Option<UserProfile>> {
        self.query_profile(
            "SELECT id, username, email, password_hash, interests, created_at
             FROM user_profiles WHERE email = ?1",
            email,
        )
    }

    /// Looks up a profile by ID. Returns `None` if no profile matches.
    pub fn get_user(&self, id: UserId) -> StoreResult<Option<UserProfile>> {
        self.query_profile(
            "SELECT id, username, email, password_hash, interests, created_at
             FROM user_profiles WHERE id = ?1",
            id.get(),
        )
    }

    fn query_profile(
        &self,
        sql: &str,
        key: impl rusqlite::ToSql,
    ) -> StoreResult<Option<UserProfile>> {
        let row = self
            .db
            .connection()
            .query_row(sql, [key], |row| {
                let id: i64 = row.get(0)?;
                let username: String = row.get(1)?;
                let email: String = row.get(2)?;
                let password_hash: String = row.get(3)?;
                let interests: String = row.get(4)?;
                let created_at: Option<i64> = row.get(5)?;
                Ok((id, username, email, password_hash, interests, created_at))
            })
            .optional()?;

        match row {
            Some((id, username, email, password_hash, interests, created_at)) => {
                Ok(Some(UserProfile {
                    id: UserId::new(id),
                    username,
                    email,
                    password_hash,
                    interests,
                    created_at: timestamp("user_profiles", created_at)?,
                }))
            }
            None => Ok(None),
        }
    }

    /// Updates the editable profile fields.
    ///
    /// Returns false if no profile exists with the given ID.
    pub fn update_user_profile(
        &self,
        id: UserId,
        username: &str,
        interests: &str,
    ) -> StoreResult<bool> {
        let updated = self.db.connection().execute(
            "UPDATE user_profiles SET username = ?1, interests = ?2 WHERE id = ?3",
            params![username, interests, id.get()],
        )?;

        Ok(updated > 0)
    }

    /// Deletes a profile and all of its progress rows.
    ///
    /// Both deletes run in one transaction. Returns `Ok(false)` without
    /// touching anything if no profile has this email.
    pub fn delete_user_by_email(&self, email: &str) -> StoreResult<bool> {
        let conn = self.db.connection();
        let tx = conn.unchecked_transaction()?;

        let user_id: Option<i64> = tx
            .query_row(
                "SELECT id FROM user_profiles WHERE email = ?1",
                [email],
                |row| row.get(0),
            )
            .optional()?;

        let Some(user_id) = user_id else {
            // Dropping the transaction rolls it back.
            return Ok(false);
        };

        let progress_rows =
            tx.execute("DELETE FROM user_progress WHERE user_id = ?1", [user_id])?;
        tx.execute("DELETE FROM user_profiles WHERE id = ?1", [user_id])?;
        tx.commit()?;

        tracing::info!(user_id, progress_rows, "Deleted user profile");
        Ok(true)
    }

    // --- Progress ---

    /// Records a finished assessment for (user, topic).
    ///
    /// Upserts on the (user_id, topic_id) key: the first call inserts, later
    /// calls overwrite the score. Scores above 100 are clamped.
    ///
    /// # Examples
    ///
    /// ```
    /// use pathway::{Database, LearningStore, TopicId, UserId};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let store = LearningStore::new(Database::in_memory()?);
    /// let (user, topic) = (UserId::new(1), TopicId::new(2));
    ///
    /// store.mark_topic_completed(user, topic, 40)?;
    /// store.mark_topic_completed(user, topic, 90)?;
    ///
    /// assert_eq!(store.assessment_score(user, topic)?, 90);
    /// assert_eq!(store.completed_topics_count(user)?, 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn mark_topic_completed(
        &self,
        user_id: UserId,
        topic_id: TopicId,
        score: u8,
    ) -> StoreResult<()> {
        let now = OffsetDateTime::now_utc().unix_timestamp();

        self.db.connection().execute(
            "INSERT INTO user_progress (user_id, topic_id, completed, score, completed_at)
             VALUES (?1, ?2, 1, ?3, ?4)
             ON CONFLICT(user_id, topic_id) DO UPDATE SET
                 completed = 1,
                 score = excluded.score,
                 completed_at = excluded.completed_at",
            params![user_id.get(), topic_id.get(), score.min(100), now],
        )?;

        tracing::debug!(
            user_id = user_id.get(),
            topic_id = topic_id.get(),
            score,
            "Recorded topic completion"
        );
        Ok(())
    }

    /// Returns true if the user has completed the topic.
    pub fn is_topic_completed(&self, user_id: UserId, topic_id: TopicId) -> StoreResult<bool> {
        let completed: Option<bool> = self
            .db
            .connection()
            .query_row(
                "SELECT completed FROM user_progress WHERE user_id = ?1 AND topic_id = ?2",
                [user_id.get(), topic_id.get()],
                |row| row.get(0),
            )
            .optional()?;

        Ok(completed.unwrap_or(false))
    }

    /// Returns the stored percentage score, 0 if the topic was never assessed.
    pub fn assessment_score(&self, user_id: UserId, topic_id: TopicId) -> StoreResult<u8> {
        let score: Option<u8> = self
            .db
            .connection()
            .query_row(
                "SELECT score FROM user_progress WHERE user_id = ?1 AND topic_id = ?2",
                [user_id.get(), topic_id.get()],
                |row| row.get(0),
            )
            .optional()?;

        Ok(score.unwrap_or(0))
    }

    /// Counts the topics the user has completed.
    pub fn completed_topics_count(&self, user_id: UserId) -> StoreResult<u32> {
        let count: u32 = self.db.connection().query_row(
            "SELECT COUNT(*) FROM user_progress WHERE user_id = ?1 AND completed = 1",
            [user_id.get()],
            |row| row.get(0),
        )?;

        Ok(count)
    }

    /// Returns `completed / total_topics * 100`, or 0 when `total_topics` is 0.
    pub fn overall_progress(&self, user_id: UserId, total_topics: u32) -> StoreResult<f32> {
        if total_topics == 0 {
            return Ok(0.0);
        }

        let completed = self.completed_topics_count(user_id)?;
        Ok(completed as f32 / total_topics as f32 * 100.0)
    }

    /// Lists all progress rows for a user, ordered by topic.
    pub fn progress_for_user(&self, user_id: UserId) -> StoreResult<Vec<UserProgress>> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare(
            "SELECT topic_id, completed, score, completed_at
             FROM user_progress
             WHERE user_id = ?1
             ORDER BY topic_id",
        )?;

        let rows = stmt.query_map([user_id.get()], |row| {
            let topic_id: i64 = row.get(0)?;
            let completed: bool = row.get(1)?;
            let score: u8 = row.get(2)?;
            let completed_at: Option<i64> = row.get(3)?;
            Ok((topic_id, completed, score, completed_at))
        })?;

        let mut progress = Vec::new();
        for row_result in rows {
            let (topic_id, completed, score, completed_at) = row_result?;
            progress.push(UserProgress {
                user_id,
                topic_id: TopicId::new(topic_id),
                completed,
                score,
                completed_at: timestamp("user_progress", completed_at)?,
            });
        }

        Ok(progress)
    }
}

fn topic_from_row(row: &Row<'_>) -> rusqlite::Result<Topic> {
    Ok(Topic::new(
        TopicId::new(row.get(0)?),
        row.get::<_, String>(1)?,
        row.get::<_, String>(2)?,
        row.get(3)?,
    ))
}

fn timestamp(table: &'static str, value: Option<i64>) -> StoreResult<Option<OffsetDateTime>> {
    value
        .map(OffsetDateTime::from_unix_timestamp)
        .transpose()
        .map_err(|e| StoreError::InvalidRecord {
            table,
            reason: format!("invalid timestamp: {e}"),
        })
}

#[cfg(test)]
#[path = "service/tests.rs"]
mod tests;
