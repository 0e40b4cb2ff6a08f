//! Federated (Social) Login Abstraction
//!
//! Wraps a platform social-login SDK that hands out identity tokens through a
//! callback API. Hosts without such an SDK inject [`UnsupportedFederatedLogin`].

use crate::error::{BridgeError, Result};

/// Callback invoked exactly once with the outcome of an SDK login attempt.
pub type AuthenticateCallback = Box<dyn FnOnce(bool) + Send + 'static>;

/// Options passed to the SDK before a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedLoginConfig {
    /// OAuth web client id the SDK should request tokens for
    pub web_client_id: Option<String>,
    /// Ask the SDK for an identity token
    pub request_id_token: bool,
    /// Ask the SDK for the account's email address
    pub request_email: bool,
    /// Ask the SDK for a server auth code
    pub request_server_auth_code: bool,
}

impl Default for FederatedLoginConfig {
    fn default() -> Self {
        Self {
            web_client_id: None,
            request_id_token: true,
            request_email: true,
            request_server_auth_code: false,
        }
    }
}

impl FederatedLoginConfig {
    pub fn with_web_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.web_client_id = Some(client_id.into());
        self
    }
}

/// Platform social-login SDK.
///
/// # Platform Support
///
/// - **Android/iOS**: native Google Sign-In SDK
/// - **Desktop/Web**: usually unavailable, see [`UnsupportedFederatedLogin`]
pub trait FederatedLogin: Send + Sync {
    /// Whether an SDK is present on this platform
    fn is_available(&self) -> bool {
        true
    }

    /// Apply login options before calling [`authenticate`](Self::authenticate)
    fn configure(&self, config: &FederatedLoginConfig) -> Result<()>;

    /// Start an interactive login; `on_result` receives `true` on success
    fn authenticate(&self, on_result: AuthenticateCallback);

    /// Identity token from the last successful login
    fn id_token(&self) -> Option<String>;

    /// Email address from the last successful login
    fn user_email(&self) -> Option<String>;

    /// Sign the SDK's account out
    fn sign_out(&self) -> Result<()>;
}

/// Stand-in for platforms that ship no social-login SDK.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedFederatedLogin;

impl FederatedLogin for UnsupportedFederatedLogin {
    fn is_available(&self) -> bool {
        false
    }

    fn configure(&self, _config: &FederatedLoginConfig) -> Result<()> {
        Err(BridgeError::NotAvailable(
            "Federated login SDK is not available on this platform".to_string(),
        ))
    }

    fn authenticate(&self, on_result: AuthenticateCallback) {
        on_result(false);
    }

    fn id_token(&self) -> Option<String> {
        None
    }

    fn user_email(&self) -> Option<String> {
        None
    }

    fn sign_out(&self) -> Result<()> {
        Ok(())
    }
}
