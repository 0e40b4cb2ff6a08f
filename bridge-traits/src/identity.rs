//! Identity Provider Abstraction
//!
//! The contract the session coordinator needs from a remote identity service:
//! dependency checks, email/password and credential sign-in, account creation,
//! sign-out, and a stream of auth-state notifications.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;

/// Handle to an authenticated user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Provider-assigned user id
    pub id: String,
    /// Primary email address (may be empty for some federated accounts)
    pub email: String,
    /// Display name, if the account has one
    pub display_name: Option<String>,
    /// Profile photo URL, if the account has one
    pub photo_url: Option<String>,
}

impl AuthUser {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            display_name: None,
            photo_url: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_photo_url(mut self, url: impl Into<String>) -> Self {
        self.photo_url = Some(url.into());
        self
    }
}

/// Result of the provider's runtime dependency check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DependencyStatus {
    /// All dependencies are present and usable
    Available,
    /// A dependency is disabled on this device
    UnavailableDisabled,
    /// A dependency is present but invalid
    UnavailableInvalid,
    /// A dependency is missing
    UnavailableMissing,
    /// The app lacks permission to use a dependency
    UnavailablePermission,
    /// A dependency must be updated first
    UnavailableUpdateRequired,
    /// A dependency is being updated right now
    UnavailableUpdating,
    /// Any other failure
    UnavailableOther,
}

impl DependencyStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, DependencyStatus::Available)
    }
}

impl fmt::Display for DependencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DependencyStatus::Available => "Available",
            DependencyStatus::UnavailableDisabled => "UnavailableDisabled",
            DependencyStatus::UnavailableInvalid => "UnavailableInvalid",
            DependencyStatus::UnavailableMissing => "UnavailableMissing",
            DependencyStatus::UnavailablePermission => "UnavailablePermission",
            DependencyStatus::UnavailableUpdateRequired => "UnavailableUpdateRequired",
            DependencyStatus::UnavailableUpdating => "UnavailableUpdating",
            DependencyStatus::UnavailableOther => "UnavailableOther",
        };
        f.write_str(s)
    }
}

/// Provider credential built from a federated identity token.
///
/// # Security
///
/// The `Debug` implementation redacts token values.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderCredential {
    /// Federated provider id (e.g. `"google.com"`)
    pub provider: String,
    /// Identity token issued by the federated SDK
    pub id_token: String,
    /// Optional access token issued alongside the identity token
    pub access_token: Option<String>,
}

impl ProviderCredential {
    pub fn new(provider: impl Into<String>, id_token: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            id_token: id_token.into(),
            access_token: None,
        }
    }
}

impl fmt::Debug for ProviderCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCredential")
            .field("provider", &self.provider)
            .field("id_token", &"[REDACTED]")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Identifier returned when subscribing to auth-state notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Receiver of provider auth-state notifications.
///
/// `None` means the provider no longer has an authenticated user.
#[async_trait]
pub trait AuthStateListener: Send + Sync {
    async fn on_auth_state_changed(&self, user: Option<AuthUser>);
}

/// Remote identity provider client.
///
/// Implementations wrap a concrete identity service SDK or REST API. All
/// failures are reported as [`BridgeError`](crate::error::BridgeError); account
/// creation reports upstream cancellation as `BridgeError::Cancelled`.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::identity::IdentityProvider;
///
/// async fn ready(provider: &dyn IdentityProvider) -> bool {
///     matches!(provider.check_and_fix_dependencies().await, Ok(s) if s.is_available())
/// }
/// ```
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Check (and repair, where possible) the provider's runtime dependencies
    async fn check_and_fix_dependencies(&self) -> Result<DependencyStatus>;

    /// Sign in with an email address and password
    async fn sign_in_with_email_and_password(&self, email: &str, password: &str)
        -> Result<AuthUser>;

    /// Create a new account and sign it in
    async fn create_user_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser>;

    /// Exchange a federated identity token for a provider credential
    fn federated_credential(&self, id_token: &str) -> ProviderCredential;

    /// Sign in with a previously exchanged credential
    async fn sign_in_with_credential(&self, credential: ProviderCredential) -> Result<AuthUser>;

    /// Sign out the provider's current user
    async fn sign_out(&self) -> Result<()>;

    /// The provider's current user, if any
    async fn current_user(&self) -> Option<AuthUser>;

    /// Register a listener for auth-state changes
    fn subscribe_auth_state(&self, listener: Arc<dyn AuthStateListener>) -> SubscriptionId;

    /// Remove a listener registered with [`subscribe_auth_state`](Self::subscribe_auth_state)
    fn unsubscribe_auth_state(&self, id: SubscriptionId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_user_builder() {
        let user = AuthUser::new("uid-1", "u@d.com")
            .with_display_name("User")
            .with_photo_url("https://example.com/p.png");

        assert_eq!(user.id, "uid-1");
        assert_eq!(user.email, "u@d.com");
        assert_eq!(user.display_name.as_deref(), Some("User"));
        assert_eq!(user.photo_url.as_deref(), Some("https://example.com/p.png"));
    }

    #[test]
    fn test_dependency_status_display() {
        assert!(DependencyStatus::Available.is_available());
        assert!(!DependencyStatus::UnavailableUpdating.is_available());
        assert_eq!(
            DependencyStatus::UnavailableMissing.to_string(),
            "UnavailableMissing"
        );
    }

    #[test]
    fn test_credential_debug_redacts_tokens() {
        let mut credential = ProviderCredential::new("google.com", "eyJ.secret.token");
        credential.access_token = Some("ya29.secret".to_string());

        let debug = format!("{:?}", credential);
        assert!(debug.contains("google.com"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_subscription_ids_are_unique() {
        assert_ne!(SubscriptionId::new(), SubscriptionId::new());
    }
}
