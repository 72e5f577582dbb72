use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
}

impl User {
    pub fn new(email: String) -> Self {
        Self {
            id: super::id::user_id(),
            email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub onboarding_completed: bool,
}

impl UserProfile {
    /// Derive a profile from the signed-in user, username taken from the
    /// email local part.
    pub fn for_user(user: &User) -> Self {
        let username = user
            .email
            .split('@')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or("user")
            .to_string();
        Self {
            id: user.id.clone(),
            display_name: username.clone(),
            username,
            onboarding_completed: false,
        }
    }
}
