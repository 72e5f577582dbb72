use std::sync::Arc;

use tracing::warn;

use crate::core::error::StorageError;
use crate::core::user::{User, UserProfile};
use crate::storage::{KvStore, CURRENT_PROFILE_KEY, CURRENT_USER_KEY};

/// Current-user state backed by the persistence adapter. Auth is mocked:
/// any credentials are accepted and a fresh user record is minted on
/// sign-in. A real backend replaces `authenticate` without changing
/// callers.
pub struct AuthSession {
    kv: Arc<dyn KvStore>,
    user: Option<User>,
    profile: Option<UserProfile>,
}

impl AuthSession {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self {
            kv,
            user: None,
            profile: None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Restore a previous session from storage. Both records must be
    /// present and well-formed; anything else clears the stored session.
    pub async fn restore(&mut self) {
        let stored_user = self.read_record::<User>(CURRENT_USER_KEY).await;
        let stored_profile = self.read_record::<UserProfile>(CURRENT_PROFILE_KEY).await;

        match (stored_user, stored_profile) {
            (Some(user), Some(profile)) => {
                self.user = Some(user);
                self.profile = Some(profile);
            }
            (None, None) => {}
            _ => {
                warn!("incomplete stored auth session, clearing");
                let _ = self.kv.remove(CURRENT_USER_KEY).await;
                let _ = self.kv.remove(CURRENT_PROFILE_KEY).await;
            }
        }
    }

    async fn read_record<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.kv.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(%key, error = %e, "failed to read auth record");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(%key, error = %e, "corrupt auth record");
                None
            }
        }
    }

    pub async fn sign_up(&mut self, email: &str, _password: &str) -> Result<&User, StorageError> {
        self.authenticate(email).await
    }

    pub async fn sign_in(&mut self, email: &str, _password: &str) -> Result<&User, StorageError> {
        self.authenticate(email).await
    }

    async fn authenticate(&mut self, email: &str) -> Result<&User, StorageError> {
        let user = User::new(email.to_string());
        let profile = UserProfile::for_user(&user);

        let user_json = serde_json::to_string(&user)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.kv.set(CURRENT_USER_KEY, &user_json).await?;

        let profile_json = serde_json::to_string(&profile)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.kv.set(CURRENT_PROFILE_KEY, &profile_json).await?;

        self.profile = Some(profile);
        Ok(self.user.insert(user))
    }

    pub async fn sign_out(&mut self) -> Result<(), StorageError> {
        self.user = None;
        self.profile = None;
        self.kv.remove(CURRENT_USER_KEY).await?;
        self.kv.remove(CURRENT_PROFILE_KEY).await?;
        Ok(())
    }

    /// One-shot onboarding: optionally set the display name, flip the
    /// completion flag, persist the profile.
    pub async fn complete_onboarding(
        &mut self,
        display_name: Option<&str>,
    ) -> Result<(), StorageError> {
        let Some(profile) = self.profile.as_mut() else {
            return Err(StorageError::NotFound("user profile".into()));
        };
        if let Some(name) = display_name {
            let name = name.trim();
            if !name.is_empty() {
                profile.display_name = name.to_string();
            }
        }
        profile.onboarding_completed = true;

        let profile_json = serde_json::to_string(profile)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.kv.set(CURRENT_PROFILE_KEY, &profile_json).await
    }
}
