//! Local key-value preferences stored as small JSON files.
//!
//! Two files mirror the app's preference namespaces: the signed-in profile
//! and a cache of completed topics. The database remains the authority for
//! progress; the cache only serves quick "is this done" checks.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::TopicId;
use crate::assessment::CompletionCache;

/// A serde value persisted as pretty JSON at a fixed path.
///
/// Loading a missing file yields `T::default()`. Saving creates the parent
/// directory if needed.
#[derive(Debug)]
pub struct JsonPreferences<T> {
    path: PathBuf,
    values: T,
}

impl<T> JsonPreferences<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Loads preferences from `path`, or defaults if the file does not exist.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let values = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read preferences from {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            T::default()
        };

        Ok(Self { path, values })
    }

    /// Writes the current values to disk.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(&self.values).context("Failed to serialize preferences")?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write preferences to {}", self.path.display()))?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn values(&self) -> &T {
        &self.values
    }

    /// Applies `f` to the values and saves the result.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) -> Result<()> {
        f(&mut self.values);
        self.save()
    }

    /// Resets every key to its default and saves.
    pub fn clear(&mut self) -> Result<()> {
        self.update(|values| *values = T::default())
    }
}

/// Keys of the profile preferences file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileState {
    pub profile_created: bool,
    pub username: String,
    pub email: String,
    pub interests: String,
}

/// The locally remembered profile of the signed-in user.
#[derive(Debug)]
pub struct ProfilePreferences {
    inner: JsonPreferences<ProfileState>,
}

impl ProfilePreferences {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            inner: JsonPreferences::load(path)?,
        })
    }

    pub fn state(&self) -> &ProfileState {
        self.inner.values()
    }

    pub fn is_profile_created(&self) -> bool {
        self.state().profile_created
    }

    /// Email of the signed-in user, `None` when nobody is signed in.
    pub fn signed_in_email(&self) -> Option<&str> {
        let state = self.state();
        (state.profile_created && !state.email.is_empty()).then_some(state.email.as_str())
    }

    /// Stores the profile fields and marks the profile as created.
    pub fn save_profile(&mut self, username: &str, email: &str, interests: &str) -> Result<()> {
        self.inner.update(|state| {
            state.username = username.to_string();
            state.email = email.to_string();
            state.interests = interests.to_string();
            state.profile_created = true;
        })
    }

    /// Forgets the identity fields and the signed-in flag.
    pub fn clear_session(&mut self) -> Result<()> {
        self.inner.update(|state| {
            state.username.clear();
            state.email.clear();
            state.interests.clear();
            state.profile_created = false;
        })
    }

    pub fn clear(&mut self) -> Result<()> {
        self.inner.clear()
    }
}

/// Keys of the learning progress preferences file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressState {
    pub completed_topics: BTreeSet<TopicId>,
    pub assessment_scores: BTreeMap<TopicId, u8>,
}

/// Cached completion flags and last scores per topic.
#[derive(Debug)]
pub struct ProgressPreferences {
    inner: JsonPreferences<ProgressState>,
}

impl ProgressPreferences {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            inner: JsonPreferences::load(path)?,
        })
    }

    pub fn state(&self) -> &ProgressState {
        self.inner.values()
    }

    pub fn is_topic_completed(&self, topic_id: TopicId) -> bool {
        self.state().completed_topics.contains(&topic_id)
    }

    pub fn mark_topic_completed(&mut self, topic_id: TopicId) -> Result<()> {
        self.inner.update(|state| {
            state.completed_topics.insert(topic_id);
        })
    }

    pub fn mark_topic_uncompleted(&mut self, topic_id: TopicId) -> Result<()> {
        self.inner.update(|state| {
            state.completed_topics.remove(&topic_id);
        })
    }

    pub fn completed_count(&self) -> usize {
        self.state().completed_topics.len()
    }

    /// Last cached score for the topic, 0 if none.
    pub fn assessment_score(&self, topic_id: TopicId) -> u8 {
        self.state()
            .assessment_scores
            .get(&topic_id)
            .copied()
            .unwrap_or(0)
    }

    /// Cached completion percentage, 0 when `total_topics` is 0.
    pub fn overall_progress(&self, total_topics: usize) -> f32 {
        if total_topics == 0 {
            return 0.0;
        }
        self.completed_count() as f32 / total_topics as f32 * 100.0
    }

    pub fn clear(&mut self) -> Result<()> {
        self.inner.clear()
    }
}

impl CompletionCache for ProgressPreferences {
    fn record_completion(&mut self, topic_id: TopicId, percentage: u8) -> Result<()> {
        self.inner.update(|state| {
            state.completed_topics.insert(topic_id);
            state.assessment_scores.insert(topic_id, percentage);
        })
    }
}
