//! Process-wide account state.
//!
//! Both stores are cheap `Arc` handles so every session can be handed the
//! same instance. The login flow owns writes to [`TokenStore`]; sync code
//! only reads it, right before each request. [`UserCache`] is written on
//! login, after a confirmed profile edit, and cleared on logout.

use std::sync::{Arc, PoisonError, RwLock};

/// Shared access token.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<Option<String>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set(token);
        store
    }

    pub fn set(&self, token: impl Into<String>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    pub fn clear(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Current token, if logged in.
    pub fn get(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// The logged-in member as shown in headers and reply editors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub member_id: i64,
    pub nickname: String,
    pub avatar_url: String,
}

/// A confirmed change to the current member's profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileEdit {
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UserCache {
    inner: Arc<RwLock<Option<CurrentUser>>>,
}

impl UserCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&self, user: CurrentUser) {
        tracing::info!("Caching current user #{}", user.member_id);
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(user);
    }

    /// Apply an edit the server has already confirmed.
    ///
    /// Returns `false` when nobody is logged in.
    pub fn apply_profile_edit(&self, edit: ProfileEdit) -> bool {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let Some(user) = guard.as_mut() else {
            return false;
        };
        if let Some(nickname) = edit.nickname {
            user.nickname = nickname;
        }
        if let Some(avatar_url) = edit.avatar_url {
            user.avatar_url = avatar_url;
        }
        true
    }

    pub fn logout(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn snapshot(&self) -> Option<CurrentUser> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether `member_id` is the logged-in member (own profile vs. other).
    pub fn is_current_user(&self, member_id: i64) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|user| user.member_id == member_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> CurrentUser {
        CurrentUser {
            member_id: 1,
            nickname: "alice".to_string(),
            avatar_url: "https://img/alice.png".to_string(),
        }
    }

    #[test]
    fn token_lifecycle() {
        let tokens = TokenStore::new();
        assert_eq!(tokens.get(), None);

        let shared = tokens.clone();
        tokens.set("abc");
        assert_eq!(shared.get().as_deref(), Some("abc"));

        shared.clear();
        assert_eq!(tokens.get(), None);
    }

    #[test]
    fn user_cache_lifecycle() {
        let cache = UserCache::new();
        assert!(!cache.apply_profile_edit(ProfileEdit::default()));

        cache.login(alice());
        assert!(cache.is_current_user(1));
        assert!(!cache.is_current_user(2));

        assert!(cache.apply_profile_edit(ProfileEdit {
            nickname: Some("alicia".to_string()),
            avatar_url: None,
        }));
        let user = cache.snapshot().unwrap();
        assert_eq!(user.nickname, "alicia");
        assert_eq!(user.avatar_url, "https://img/alice.png");

        cache.logout();
        assert_eq!(cache.snapshot(), None);
        assert!(!cache.is_current_user(1));
    }
}
