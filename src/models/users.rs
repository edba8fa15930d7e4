use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
    System,
}

impl Theme {
    /// Resolves whether the dark appearance applies, deferring to the
    /// platform preference for `System`.
    pub fn is_dark(self, prefers_dark: bool) -> bool {
        match self {
            Theme::Dark => true,
            Theme::Light => false,
            Theme::System => prefers_dark,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub referral_code: Option<String>,
    #[serde(default)]
    pub theme: Theme,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordUpdate {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ThemeUpdate {
    pub theme: Theme,
}

/// The authenticated session a view works against. Views receive it
/// explicitly when they are built.
#[derive(Clone, Debug, Default)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
}

impl Session {
    pub fn new(token: Option<String>, user: Option<User>) -> Self {
        Self { token, user }
    }

    pub fn is_active(&self) -> bool {
        self.token.is_some()
    }

    pub fn end(&mut self) {
        self.token = None;
        self.user = None;
    }
}

/// Shared handle to the session. The API client reads the token from it on
/// every request, so ending the session through any clone logs out all of
/// them.
#[derive(Clone, Debug, Default)]
pub struct SessionHandle(Arc<RwLock<Session>>);

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        Self(Arc::new(RwLock::new(session)))
    }

    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn is_active(&self) -> bool {
        self.read().is_active()
    }

    /// Replaces the user of a live session. Ignored once the session ended.
    pub fn set_user(&self, user: User) {
        let mut session = self.write();
        if session.is_active() {
            session.user = Some(user);
        }
    }

    pub fn update_user(&self, update: impl FnOnce(&mut User)) {
        if let Some(user) = self.write().user.as_mut() {
            update(user);
        }
    }

    pub fn end(&self) {
        self.write().end();
    }

    // The lock is never held across an await, a poisoned guard still holds
    // a consistent session.
    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<Session> for SessionHandle {
    fn from(session: Session) -> Self {
        Self::new(session)
    }
}
