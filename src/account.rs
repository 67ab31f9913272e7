//! Account flows: sign-up, sign-in, sign-out, profile edits and deletion.
//!
//! These compose the store with the profile and progress preferences. The
//! store is the authority for identities; the preferences only remember who
//! is signed in on this device.

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::prefs::{ProfilePreferences, ProgressPreferences};
use crate::{LearningStore, NewUserProfile, StoreError, UserProfile};

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Errors returned by account flows.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("please fill all required fields")]
    MissingFields,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("please enter a valid email address")]
    InvalidEmail,

    #[error("password must be at least 6 characters")]
    PasswordTooShort,

    #[error("an account with this email already exists, please sign in instead")]
    EmailTaken,

    #[error("no account exists with this email address")]
    UnknownEmail,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("not signed in")]
    NotSignedIn,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to update local preferences: {0}")]
    Preferences(#[source] anyhow::Error),
}

impl AccountError {
    /// Returns true for errors caused by user input rather than the system.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, AccountError::Store(_) | AccountError::Preferences(_))
    }
}

/// Hashes a password as lowercase hex SHA-256 of its UTF-8 bytes.
///
/// Unsalted and fast. It keeps plain text out of the database and nothing more.
///
/// # Examples
///
/// ```
/// use pathway::hash_password;
///
/// assert_eq!(
///     hash_password("abc"),
///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
/// );
/// ```
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Input collected by a sign-up form.
#[derive(Debug, Clone, Default)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub interests: String,
}

impl SignUpRequest {
    /// Checks the form fields. All fields are compared after trimming.
    pub fn validate(&self) -> Result<(), AccountError> {
        let password = self.password.trim();
        let email = self.email.trim();

        if self.username.trim().is_empty() || email.is_empty() || password.is_empty() {
            return Err(AccountError::MissingFields);
        }
        if password != self.confirm_password.trim() {
            return Err(AccountError::PasswordMismatch);
        }
        if !email.contains('@') || !email.contains('.') {
            return Err(AccountError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AccountError::PasswordTooShort);
        }
        Ok(())
    }
}

/// Creates an account and signs it in on this device.
pub fn sign_up(
    store: &LearningStore,
    profile_prefs: &mut ProfilePreferences,
    request: &SignUpRequest,
) -> Result<UserProfile, AccountError> {
    request.validate()?;

    let email = request.email.trim();
    if store.get_user_by_email(email)?.is_some() {
        return Err(AccountError::EmailTaken);
    }

    let new_profile = NewUserProfile::new(
        request.username.trim(),
        email,
        hash_password(request.password.trim()),
        request.interests.trim(),
    );
    let id = match store.create_user_profile(&new_profile) {
        Ok(id) => id,
        Err(e) if e.is_constraint_violation() => return Err(AccountError::EmailTaken),
        Err(e) => return Err(e.into()),
    };

    let profile = store
        .get_user(id)?
        .ok_or(AccountError::UnknownEmail)?;

    profile_prefs
        .save_profile(&profile.username, &profile.email, &profile.interests)
        .map_err(AccountError::Preferences)?;

    tracing::info!(user_id = id.get(), "Account created");
    Ok(profile)
}

/// Verifies credentials and remembers the profile on this device.
pub fn sign_in(
    store: &LearningStore,
    profile_prefs: &mut ProfilePreferences,
    email: &str,
    password: &str,
) -> Result<UserProfile, AccountError> {
    let email = email.trim();
    let password = password.trim();
    if email.is_empty() || password.is_empty() {
        return Err(AccountError::MissingFields);
    }

    let profile = store
        .get_user_by_email(email)?
        .ok_or(AccountError::UnknownEmail)?;

    if !profile.password_matches(&hash_password(password)) {
        return Err(AccountError::InvalidCredentials);
    }

    profile_prefs
        .save_profile(&profile.username, &profile.email, &profile.interests)
        .map_err(AccountError::Preferences)?;

    Ok(profile)
}

/// Forgets the signed-in profile on this device. Stored data is kept.
pub fn sign_out(profile_prefs: &mut ProfilePreferences) -> Result<(), AccountError> {
    profile_prefs
        .clear_session()
        .map_err(AccountError::Preferences)
}

/// Resolves the signed-in profile against the store.
///
/// Returns `None` when nobody is signed in or the remembered email no longer
/// has an account.
pub fn current_user(
    store: &LearningStore,
    profile_prefs: &ProfilePreferences,
) -> Result<Option<UserProfile>, AccountError> {
    match profile_prefs.signed_in_email() {
        Some(email) => Ok(store.get_user_by_email(email)?),
        None => Ok(None),
    }
}

/// Changes the username and interests of the signed-in profile.
pub fn update_profile(
    store: &LearningStore,
    profile_prefs: &mut ProfilePreferences,
    username: Option<&str>,
    interests: Option<&str>,
) -> Result<UserProfile, AccountError> {
    let profile = current_user(store, profile_prefs)?.ok_or(AccountError::NotSignedIn)?;

    let username = username.map(str::trim).unwrap_or(&profile.username);
    let interests = interests.map(str::trim).unwrap_or(&profile.interests);
    if username.is_empty() {
        return Err(AccountError::MissingFields);
    }

    if !store.update_user_profile(profile.id, username, interests)? {
        return Err(AccountError::NotSignedIn);
    }
    let updated = store
        .get_user(profile.id)?
        .ok_or(AccountError::NotSignedIn)?;

    profile_prefs
        .save_profile(&updated.username, &updated.email, &updated.interests)
        .map_err(AccountError::Preferences)?;

    Ok(updated)
}

/// Deletes the signed-in account and every local trace of it.
///
/// The store delete runs first and is atomic. Preference files are cleared
/// afterwards even if the account had already been removed from the store.
pub fn delete_account(
    store: &LearningStore,
    profile_prefs: &mut ProfilePreferences,
    progress_prefs: &mut ProgressPreferences,
) -> Result<bool, AccountError> {
    let email = profile_prefs
        .signed_in_email()
        .ok_or(AccountError::NotSignedIn)?
        .to_string();

    let deleted = store.delete_user_by_email(&email)?;

    profile_prefs.clear().map_err(AccountError::Preferences)?;
    progress_prefs.clear().map_err(AccountError::Preferences)?;

    tracing::info!(deleted, "Account data cleared");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, TopicId};
    use tempfile::{TempDir, tempdir};

    struct Fixture {
        _dir: TempDir,
        store: LearningStore,
        profile: ProfilePreferences,
        progress: ProgressPreferences,
    }

    fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let profile = ProfilePreferences::load(dir.path().join("profile_prefs.json")).unwrap();
        let progress =
            ProgressPreferences::load(dir.path().join("learning_progress_prefs.json")).unwrap();
        Fixture {
            _dir: dir,
            store: LearningStore::new(Database::in_memory().unwrap()),
            profile,
            progress,
        }
    }

    fn request(email: &str) -> SignUpRequest {
        SignUpRequest {
            username: "Ada".to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            interests: String::new(),
        }
    }

    #[test]
    fn hash_is_lowercase_hex_sha256() {
        let hash = hash_password("secret1");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(hash, hash_password("secret1"));
        assert_ne!(hash, hash_password("secret2"));
    }

    #[test]
    fn validate_rejects_bad_forms() {
        let cases = [
            (SignUpRequest { username: " ".into(), ..request("a@b.c") }, "fill"),
            (SignUpRequest { confirm_password: "other1".into(), ..request("a@b.c") }, "match"),
            (request("not-an-email"), "valid email"),
            (
                SignUpRequest {
                    password: "abc".into(),
                    confirm_password: "abc".into(),
                    ..request("a@b.c")
                },
                "at least 6",
            ),
        ];

        for (req, message) in cases {
            let err = req.validate().unwrap_err();
            assert!(err.is_user_error());
            assert!(err.to_string().contains(message), "{err} should mention {message}");
        }

        assert!(request("a@b.c").validate().is_ok());
    }

    #[test]
    fn sign_up_creates_profile_and_signs_in() {
        let mut f = fixture();

        let profile = sign_up(&f.store, &mut f.profile, &request(" ada@example.com ")).unwrap();

        assert!(profile.id.get() > 0);
        assert_eq!(profile.email, "ada@example.com");
        assert_eq!(profile.password_hash, hash_password("secret1"));
        assert_eq!(f.profile.signed_in_email(), Some("ada@example.com"));
    }

    #[test]
    fn sign_up_twice_reports_email_taken() {
        let mut f = fixture();
        sign_up(&f.store, &mut f.profile, &request("ada@example.com")).unwrap();

        let err = sign_up(&f.store, &mut f.profile, &request("ada@example.com")).unwrap_err();

        assert!(matches!(err, AccountError::EmailTaken));
    }

    #[test]
    fn sign_in_distinguishes_unknown_email_and_wrong_password() {
        let mut f = fixture();
        sign_up(&f.store, &mut f.profile, &request("ada@example.com")).unwrap();
        sign_out(&mut f.profile).unwrap();

        let unknown = sign_in(&f.store, &mut f.profile, "bob@example.com", "secret1");
        let wrong = sign_in(&f.store, &mut f.profile, "ada@example.com", "secret2");
        assert!(matches!(unknown, Err(AccountError::UnknownEmail)));
        assert!(matches!(wrong, Err(AccountError::InvalidCredentials)));
        assert_eq!(f.profile.signed_in_email(), None);

        let profile = sign_in(&f.store, &mut f.profile, "ada@example.com", " secret1 ").unwrap();
        assert_eq!(profile.username, "Ada");
        assert_eq!(f.profile.signed_in_email(), Some("ada@example.com"));
    }

    #[test]
    fn current_user_requires_sign_in() {
        let mut f = fixture();
        assert_eq!(current_user(&f.store, &f.profile).unwrap(), None);

        let created = sign_up(&f.store, &mut f.profile, &request("ada@example.com")).unwrap();

        assert_eq!(current_user(&f.store, &f.profile).unwrap(), Some(created));
    }

    #[test]
    fn update_profile_writes_store_and_prefs() {
        let mut f = fixture();
        sign_up(&f.store, &mut f.profile, &request("ada@example.com")).unwrap();

        let updated =
            update_profile(&f.store, &mut f.profile, None, Some("compilers, tea")).unwrap();

        assert_eq!(updated.username, "Ada");
        assert_eq!(updated.interests, "compilers, tea");
        assert_eq!(f.profile.state().interests, "compilers, tea");
    }

    #[test]
    fn delete_account_clears_store_and_preferences() {
        let mut f = fixture();
        let profile = sign_up(&f.store, &mut f.profile, &request("ada@example.com")).unwrap();
        f.store
            .mark_topic_completed(profile.id, TopicId::new(1), 100)
            .unwrap();
        f.progress
            .mark_topic_completed(TopicId::new(1))
            .unwrap();

        assert!(delete_account(&f.store, &mut f.profile, &mut f.progress).unwrap());

        assert_eq!(f.store.get_user_by_email("ada@example.com").unwrap(), None);
        assert!(!f.store.is_topic_completed(profile.id, TopicId::new(1)).unwrap());
        assert!(!f.profile.is_profile_created());
        assert_eq!(f.progress.completed_count(), 0);
    }

    #[test]
    fn update_profile_reports_row_that_was_not_updated() {
        let mut f = fixture();
        sign_up(&f.store, &mut f.profile, &request("ada@example.com")).unwrap();
        f.store
            .database()
            .connection()
            .execute_batch(
                "CREATE TEMP TRIGGER skip_profile_update BEFORE UPDATE ON user_profiles
                 BEGIN SELECT RAISE(IGNORE); END;",
            )
            .unwrap();

        let err = update_profile(&f.store, &mut f.profile, Some("grace"), None).unwrap_err();

        assert!(matches!(err, AccountError::NotSignedIn));
        assert_eq!(f.profile.state().username, "Ada");
    }

    #[test]
    fn delete_account_without_sign_in_fails() {
        let mut f = fixture();

        let err = delete_account(&f.store, &mut f.profile, &mut f.progress).unwrap_err();

        assert!(matches!(err, AccountError::NotSignedIn));
    }
}
