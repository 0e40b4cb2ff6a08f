use crate::handler::SessionEventHandler;
use bridge_traits::log::LoggerSink;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Callback reporting whether a sign-in flow succeeded.
pub type ResultCallback = Box<dyn FnOnce(bool) + Send + 'static>;

/// Callback receiving the email address of a newly created account.
pub type CompletionCallback = Box<dyn FnOnce(String) + Send + 'static>;

/// Last-known credentials persisted for session resumption.
///
/// Empty persisted values are reported as `None`.
///
/// # Security
///
/// The password is never printed by `Debug`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SavedCredentials {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub photo_url: Option<String>,
}

impl SavedCredentials {
    /// Email and password, when both are saved.
    pub fn email_and_password(&self) -> Option<(&str, &str)> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) => Some((email, password)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.photo_url.is_none()
    }
}

impl fmt::Debug for SavedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SavedCredentials")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("photo_url", &self.photo_url)
            .finish()
    }
}

/// Progress of the one-time initialization, observable through a watch channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitializationStatus {
    /// `initialize` has not been called.
    NotStarted,
    /// The project identifier was missing; this coordinator cannot initialize.
    ConfigurationFailed,
    /// A dependency check is running.
    Resolving,
    /// The last attempt found no network. Call `retry` once connectivity returns.
    Offline,
    /// Provider dependencies are available and auth-state notifications are subscribed.
    Ready,
    /// The provider reported a problem with its dependencies.
    DependencyFailed { reason: String },
}

impl InitializationStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, InitializationStatus::Ready)
    }
}

/// Result of one dependency-resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// The project identifier is missing; no attempt can run.
    ConfigurationFailed,
    /// The network was unreachable; nothing else was attempted.
    Offline,
    /// Dependencies are available.
    Ready,
    /// Dependencies are unavailable or the check failed.
    DependencyFailed(String),
}

impl From<&ResolutionOutcome> for InitializationStatus {
    fn from(outcome: &ResolutionOutcome) -> Self {
        match outcome {
            ResolutionOutcome::ConfigurationFailed => InitializationStatus::ConfigurationFailed,
            ResolutionOutcome::Offline => InitializationStatus::Offline,
            ResolutionOutcome::Ready => InitializationStatus::Ready,
            ResolutionOutcome::DependencyFailed(reason) => InitializationStatus::DependencyFailed {
                reason: reason.clone(),
            },
        }
    }
}

/// Handle to a background dependency resolution.
///
/// Dropping the handle detaches the task; it keeps running.
#[derive(Debug)]
pub struct ResolutionTask {
    handle: JoinHandle<ResolutionOutcome>,
}

impl ResolutionTask {
    pub(crate) fn new(handle: JoinHandle<ResolutionOutcome>) -> Self {
        Self { handle }
    }

    /// Wait for the attempt to finish.
    pub async fn wait(self) -> ResolutionOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(err) => ResolutionOutcome::DependencyFailed(format!(
                "Dependency resolution task aborted: {}",
                err
            )),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Options accepted by `SessionCoordinator::initialize`.
#[derive(Clone, Default)]
pub struct InitializeOptions {
    /// Receives session events. Falls back to the configured event bus.
    pub event_handler: Option<Arc<dyn SessionEventHandler>>,
    /// Host logger that session log lines are mirrored to.
    pub logger: Option<Arc<dyn LoggerSink>>,
}

impl InitializeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event_handler(mut self, handler: Arc<dyn SessionEventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn LoggerSink>) -> Self {
        self.logger = Some(logger);
        self
    }
}

impl fmt::Debug for InitializeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitializeOptions")
            .field(
                "event_handler",
                &self.event_handler.as_ref().map(|_| "SessionEventHandler { ... }"),
            )
            .field("logger", &self.logger.as_ref().map(|_| "LoggerSink { ... }"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_credentials_debug_hides_password() {
        let saved = SavedCredentials {
            user_id: Some("uid-1".to_string()),
            email: Some("a@x.com".to_string()),
            password: Some("hunter2".to_string()),
            photo_url: None,
        };

        let debug = format!("{:?}", saved);
        assert!(debug.contains("uid-1"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_email_and_password_requires_both() {
        let mut saved = SavedCredentials {
            email: Some("a@x.com".to_string()),
            ..Default::default()
        };
        assert!(saved.email_and_password().is_none());
        assert!(!saved.is_empty());

        saved.password = Some("pw".to_string());
        assert_eq!(saved.email_and_password(), Some(("a@x.com", "pw")));
    }

    #[test]
    fn test_status_from_outcome() {
        assert_eq!(
            InitializationStatus::from(&ResolutionOutcome::Offline),
            InitializationStatus::Offline
        );
        assert!(InitializationStatus::from(&ResolutionOutcome::Ready).is_ready());
        assert_eq!(
            InitializationStatus::from(&ResolutionOutcome::DependencyFailed("x".into())),
            InitializationStatus::DependencyFailed {
                reason: "x".to_string()
            }
        );
    }

    #[test]
    fn test_status_serializes_with_reason() {
        let status = InitializationStatus::DependencyFailed {
            reason: "UnavailableMissing".to_string(),
        };
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("UnavailableMissing"));
    }

    #[tokio::test]
    async fn test_resolution_task_wait() {
        let task = ResolutionTask::new(tokio::spawn(async { ResolutionOutcome::Ready }));
        assert_eq!(task.wait().await, ResolutionOutcome::Ready);
    }
}
