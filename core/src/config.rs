//! Account settings for the PetFriends service.

use std::fmt;

use log::{debug, info};

use crate::error::PetFriendsError;

pub const DEFAULT_BASE_URL: &str = "https://petfriends.skillfactory.ru";

pub const BASE_URL_VAR: &str = "PETFRIENDS_BASE_URL";
pub const EMAIL_VAR: &str = "PETFRIENDS_EMAIL";
pub const PASSWORD_VAR: &str = "PETFRIENDS_PASSWORD";

/// Where to connect and which account to log in with.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub email: String,
    pub password: String,
}

impl Settings {
    pub fn new(base_url: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Load from the process environment after applying `.env`, if present.
    pub fn from_env() -> Result<Self, PetFriendsError> {
        match dotenvy::dotenv() {
            Ok(path) => info!("Loaded .env from: {}", path.display()),
            Err(e) => debug!("No .env applied: {e}"),
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup. Empty values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PetFriendsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let base_url = read(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let email = read(EMAIL_VAR).ok_or(PetFriendsError::MissingSetting(EMAIL_VAR))?;
        let password = read(PASSWORD_VAR).ok_or(PetFriendsError::MissingSetting(PASSWORD_VAR))?;
        Ok(Self {
            base_url,
            email,
            password,
        })
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
