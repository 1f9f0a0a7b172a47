//! Native shell capabilities: sign-in state and the signed-in user's profile.

use async_trait::async_trait;
use models::UserProfile;
use thiserror::Error;
use tokio::sync::{RwLock, broadcast};
use tracing::info;
use utils::config::{Config, ProfileConfig};

use super::query_cache::QueryError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    #[error("not signed in")]
    NotSignedIn,
    #[error("no profile configured")]
    NoProfile,
    #[error("shell call failed: {0}")]
    Failed(String),
}

impl From<ShellError> for QueryError {
    fn from(e: ShellError) -> Self {
        QueryError::Failed(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    SignInComplete(UserProfile),
    SignOutComplete,
}

/// What the desktop shell exposes to the inventory client.
#[async_trait]
pub trait ShellBridge: Send + Sync {
    async fn sign_in(&self) -> Result<UserProfile, ShellError>;
    async fn sign_out(&self) -> Result<(), ShellError>;
    async fn check_if_signed_in(&self) -> bool;
    async fn get_user_info(&self) -> Result<UserProfile, ShellError>;
    fn subscribe(&self) -> broadcast::Receiver<ShellEvent>;
}

pub fn profile_from_config(profile: ProfileConfig) -> UserProfile {
    UserProfile {
        id: profile.id,
        name: profile.name,
        given_name: profile.given_name,
        family_name: profile.family_name,
        picture: profile.picture,
    }
}

/// In-process shell backed by a configured profile. Used by the CLI and tests.
pub struct LocalShell {
    profile: Option<UserProfile>,
    signed_in: RwLock<bool>,
    events: broadcast::Sender<ShellEvent>,
}

impl LocalShell {
    pub fn new(profile: Option<UserProfile>) -> Self {
        Self::with_state(profile, false)
    }

    /// A shell that starts out signed in as `profile`.
    pub fn signed_in(profile: UserProfile) -> Self {
        Self::with_state(Some(profile), true)
    }

    fn with_state(profile: Option<UserProfile>, signed_in: bool) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            profile,
            signed_in: RwLock::new(signed_in),
            events,
        }
    }

    /// Signed in as the configured profile if there is one; otherwise signed out
    /// with sign-in unavailable.
    pub fn from_config(config: &Config) -> Self {
        match config.profile.clone() {
            Some(profile) => Self::signed_in(profile_from_config(profile)),
            None => Self::new(None),
        }
    }
}

#[async_trait]
impl ShellBridge for LocalShell {
    async fn sign_in(&self) -> Result<UserProfile, ShellError> {
        let profile = self.profile.clone().ok_or(ShellError::NoProfile)?;
        *self.signed_in.write().await = true;
        info!(user = %profile.display_name(), "Signed in");
        let _ = self.events.send(ShellEvent::SignInComplete(profile.clone()));
        Ok(profile)
    }

    async fn sign_out(&self) -> Result<(), ShellError> {
        *self.signed_in.write().await = false;
        info!("Signed out");
        let _ = self.events.send(ShellEvent::SignOutComplete);
        Ok(())
    }

    async fn check_if_signed_in(&self) -> bool {
        *self.signed_in.read().await
    }

    async fn get_user_info(&self) -> Result<UserProfile, ShellError> {
        if !*self.signed_in.read().await {
            return Err(ShellError::NotSignedIn);
        }
        self.profile.clone().ok_or(ShellError::NoProfile)
    }

    fn subscribe(&self) -> broadcast::Receiver<ShellEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> UserProfile {
        UserProfile {
            id: "u1".into(),
            name: "Ada Lovelace".into(),
            given_name: "Ada".into(),
            family_name: "Lovelace".into(),
            picture: None,
        }
    }

    #[tokio::test]
    async fn test_sign_in_and_out_emit_events() {
        let shell = LocalShell::new(Some(ada()));
        let mut events = shell.subscribe();
        assert!(!shell.check_if_signed_in().await);
        assert_eq!(shell.get_user_info().await, Err(ShellError::NotSignedIn));

        let profile = shell.sign_in().await.unwrap();
        assert_eq!(profile.given_name, "Ada");
        assert!(shell.check_if_signed_in().await);
        assert_eq!(events.recv().await.unwrap(), ShellEvent::SignInComplete(ada()));

        shell.sign_out().await.unwrap();
        assert_eq!(events.recv().await.unwrap(), ShellEvent::SignOutComplete);
        assert!(shell.get_user_info().await.is_err());
    }

    #[tokio::test]
    async fn test_without_profile_sign_in_fails() {
        let shell = LocalShell::new(None);
        assert_eq!(shell.sign_in().await, Err(ShellError::NoProfile));
    }

    #[tokio::test]
    async fn test_from_config_starts_signed_in() {
        let config = Config {
            profile: Some(ProfileConfig {
                id: "u1".into(),
                name: "Ada Lovelace".into(),
                given_name: "Ada".into(),
                family_name: "Lovelace".into(),
                picture: None,
            }),
            ..Config::default()
        };
        let shell = LocalShell::from_config(&config);
        assert_eq!(shell.get_user_info().await.unwrap(), ada());

        let anonymous = LocalShell::from_config(&Config::default());
        assert!(!anonymous.check_if_signed_in().await);
    }
}
