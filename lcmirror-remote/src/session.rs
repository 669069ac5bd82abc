//! Session lifecycle: probe stored cookies, fall back to interactive login.

use std::path::{Path, PathBuf};

use lcmirror_core::{session_store, SessionState, StoreError};
use serde::Deserialize;
use serde_json::json;

use crate::client::ApiClient;
use crate::error::AuthError;

const SIGNED_IN_QUERY: &str = "query globalData { userStatus { isSignedIn } }";

/// Obtains fresh credentials from the user (browser, prompt, ...).
pub trait InteractiveLogin {
    fn perform_interactive_login(&self) -> Result<SessionState, AuthError>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GlobalData {
    user_status: UserStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserStatus {
    is_signed_in: bool,
}

pub struct SessionManager<'a> {
    client: &'a ApiClient,
    login: &'a dyn InteractiveLogin,
    home: PathBuf,
}

impl<'a> SessionManager<'a> {
    /// `home` is the user's home directory; the session lives in
    /// `<home>/.lcmirror/session.json`.
    pub fn new(client: &'a ApiClient, login: &'a dyn InteractiveLogin, home: &Path) -> Self {
        Self {
            client,
            login,
            home: home.to_path_buf(),
        }
    }

    /// Whether the service still accepts `session`. Any failure counts as no.
    pub fn is_valid(&self, session: &SessionState) -> bool {
        if !session.has_credentials() {
            return false;
        }
        match self
            .client
            .graphql::<GlobalData>(session, "globalData", SIGNED_IN_QUERY, json!({}))
        {
            Ok(data) => data.user_status.is_signed_in,
            Err(e) => {
                tracing::debug!(error = %e, "session probe failed");
                false
            }
        }
    }

    /// Return a session the service accepts.
    ///
    /// The stored session is reused when it probes valid and
    /// `force_interactive` is false. Otherwise a new one is obtained through
    /// the login collaborator, probed, and persisted with mode 0600.
    pub fn authenticate(&self, force_interactive: bool) -> Result<SessionState, AuthError> {
        if force_interactive {
            tracing::info!("interactive login forced; ignoring stored session");
        } else {
            match self.load_stored()? {
                Some(mut stored) if self.is_valid(&stored) => {
                    tracing::info!("stored session is valid");
                    stored.valid = true;
                    return Ok(stored);
                }
                Some(_) => tracing::warn!("stored session rejected; re-authentication required"),
                None => tracing::info!("no stored session"),
            }
        }

        let mut fresh = self.login.perform_interactive_login()?;
        if !self.is_valid(&fresh) {
            return Err(AuthError::Rejected);
        }
        session_store::save_at(&self.home, &fresh)?;
        fresh.valid = true;
        tracing::info!("new session saved");
        Ok(fresh)
    }

    /// Stored session, if any. An unreadable file is treated as absent; the
    /// next successful login overwrites it.
    fn load_stored(&self) -> Result<Option<SessionState>, AuthError> {
        match session_store::load_at(&self.home) {
            Ok(stored) => Ok(stored),
            Err(StoreError::Corrupt { path, source }) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %source,
                    "stored session unreadable; ignoring it"
                );
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
