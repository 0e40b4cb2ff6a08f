//! # Session Configuration Module
//!
//! Provides configuration management for the authentication session core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct an `AuthConfig`
//! instance that holds every collaborator the session coordinator talks to.
//! The builder enforces fail-fast validation of required bridges; the project
//! identifier is validated later, when the coordinator initializes, so hosts
//! can construct a coordinator before the identifier is known.
//!
//! ## Required Dependencies
//!
//! - `IdentityProvider` - Remote sign-in and auth-state notifications
//! - `SettingsStore` - Persisted last-known credentials
//! - `NetworkMonitor` - Reachability check before dependency resolution
//!
//! ## Optional Dependencies
//!
//! - `FederatedLogin` - Social-login SDK (default: `UnsupportedFederatedLogin`)
//! - `EventBus` - Broadcast channel for hosts that prefer event streams
//!
//! When the `desktop-shims` feature is enabled, desktop-ready defaults for
//! `SettingsStore` and `NetworkMonitor` are injected automatically if not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::AuthConfig;
//! use std::sync::Arc;
//!
//! let config = AuthConfig::builder()
//!     .project_id("my-project")
//!     .identity_provider(Arc::new(MyIdentityProvider))
//!     .settings_store(Arc::new(MySettingsStore))
//!     .network_monitor(Arc::new(MyNetworkMonitor))
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! ## Error Handling
//!
//! Missing bridges produce `Error::CapabilityMissing` with a hint on how to
//! provide them on each platform. Bad namespaces produce `Error::InvalidNamespace`.

use crate::error::{Error, Result};
use crate::events::EventBus;
use bridge_traits::{
    FederatedLogin, FederatedLoginConfig, IdentityProvider, NetworkMonitor, SettingsStore,
    UnsupportedFederatedLogin,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Environment variable consulted when no project identifier is set explicitly.
pub const PROJECT_ID_ENV: &str = "SESSION_PROJECT_ID";

/// Namespace used for persisted keys when neither a namespace nor a project
/// identifier is available.
pub const DEFAULT_CREDENTIAL_NAMESPACE: &str = "session";

/// Configuration for the authentication session core.
///
/// Use [`AuthConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct AuthConfig {
    /// Identity-provider project identifier. May be empty; the coordinator
    /// rejects initialization in that case.
    pub project_id: String,

    /// Prefix for persisted credential keys (`"{namespace}.Email"`, ...)
    pub credential_namespace: String,

    /// Remote identity service (required)
    pub identity_provider: Arc<dyn IdentityProvider>,

    /// Persisted key-value preferences (required)
    pub settings_store: Arc<dyn SettingsStore>,

    /// Reachability signal (required)
    pub network_monitor: Arc<dyn NetworkMonitor>,

    /// Platform social-login SDK
    pub federated_login: Arc<dyn FederatedLogin>,

    /// Options passed to the social-login SDK before authenticating
    pub federated_config: FederatedLoginConfig,

    /// Optional event bus for broadcast-style observers
    pub event_bus: Option<EventBus>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("project_id", &self.project_id)
            .field("credential_namespace", &self.credential_namespace)
            .field("identity_provider", &"IdentityProvider { ... }")
            .field("settings_store", &"SettingsStore { ... }")
            .field("network_monitor", &"NetworkMonitor { ... }")
            .field("federated_login_available", &self.federated_login.is_available())
            .field("federated_config", &self.federated_config)
            .field("event_bus", &self.event_bus)
            .finish()
    }
}

impl AuthConfig {
    /// Creates a new builder for constructing an `AuthConfig`.
    pub fn builder() -> AuthConfigBuilder {
        AuthConfigBuilder::default()
    }

    /// Whether a non-empty project identifier is configured.
    pub fn has_project_id(&self) -> bool {
        !self.project_id.trim().is_empty()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// Only checks what the builder can judge on its own; a missing project
    /// identifier is reported by the coordinator at initialization time.
    pub fn validate(&self) -> Result<()> {
        if self.credential_namespace.trim().is_empty() {
            return Err(Error::InvalidNamespace {
                namespace: self.credential_namespace.clone(),
                reason: "cannot be empty",
            });
        }

        if self.credential_namespace.contains('.') {
            return Err(Error::InvalidNamespace {
                namespace: self.credential_namespace.clone(),
                reason: "must not contain '.'",
            });
        }

        Ok(())
    }
}

fn identity_provider_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "IdentityProvider",
        hint: "inject an adapter around the platform identity SDK",
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn settings_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "SettingsStore",
        hint: "credential persistence needs a store. Desktop: enable the 'desktop-shims' \
               feature for the default SqliteSettingsStore. Mobile: inject platform-native \
               settings (UserDefaults/DataStore)",
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn network_monitor_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "NetworkMonitor",
        hint: "the reachability check needs a monitor. Desktop: enable the 'desktop-shims' \
               feature for the default DesktopNetworkMonitor. Mobile: inject the platform \
               reachability API",
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_settings_store(path: PathBuf) -> Result<Arc<dyn SettingsStore>> {
    use bridge_desktop::SqliteSettingsStore;
    use std::thread;
    use tokio::runtime::{Handle, Runtime};

    let init_store = |path: PathBuf| -> Result<_> {
        let runtime = Runtime::new().map_err(|e| {
            Error::DefaultSettingsStore(format!("could not start a Tokio runtime: {}", e))
        })?;

        runtime
            .block_on(SqliteSettingsStore::new(path))
            .map_err(|e| Error::DefaultSettingsStore(e.to_string()))
    };

    // block_on panics inside a runtime, so build on a plain thread there
    let store = match Handle::try_current() {
        Ok(_) => thread::spawn(move || init_store(path))
            .join()
            .map_err(|_| {
                Error::DefaultSettingsStore("worker thread panicked while opening".to_string())
            })??,
        Err(_) => init_store(path)?,
    };

    let store: Arc<dyn SettingsStore> = Arc::new(store);
    Ok(store)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_settings_store(_path: PathBuf) -> Result<Arc<dyn SettingsStore>> {
    Err(settings_store_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_network_monitor() -> Result<Arc<dyn NetworkMonitor>> {
    use bridge_desktop::DesktopNetworkMonitor;

    let monitor: Arc<dyn NetworkMonitor> = Arc::new(DesktopNetworkMonitor::new());
    Ok(monitor)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_network_monitor() -> Result<Arc<dyn NetworkMonitor>> {
    Err(network_monitor_missing_error())
}

/// Builder for constructing [`AuthConfig`] instances.
#[derive(Default)]
pub struct AuthConfigBuilder {
    project_id: Option<String>,
    credential_namespace: Option<String>,
    settings_path: Option<PathBuf>,
    identity_provider: Option<Arc<dyn IdentityProvider>>,
    settings_store: Option<Arc<dyn SettingsStore>>,
    network_monitor: Option<Arc<dyn NetworkMonitor>>,
    federated_login: Option<Arc<dyn FederatedLogin>>,
    federated_config: Option<FederatedLoginConfig>,
    event_bus: Option<EventBus>,
}

impl AuthConfigBuilder {
    /// Sets the identity-provider project identifier.
    ///
    /// When not set, `SESSION_PROJECT_ID` is read from the environment.
    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Sets the prefix used for persisted credential keys.
    ///
    /// Default: the project identifier.
    pub fn credential_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.credential_namespace = Some(namespace.into());
        self
    }

    /// Sets the database file used by the desktop default settings store.
    ///
    /// Ignored when a settings store is injected.
    pub fn settings_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    /// Sets the identity provider implementation (required).
    pub fn identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity_provider = Some(provider);
        self
    }

    /// Sets the settings store implementation (required).
    ///
    /// If not provided, the desktop default (SQLite) is used when the
    /// `desktop-shims` feature is enabled.
    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    /// Sets the network monitor implementation (required).
    ///
    /// If not provided, the desktop default (TCP probe) is used when the
    /// `desktop-shims` feature is enabled.
    pub fn network_monitor(mut self, monitor: Arc<dyn NetworkMonitor>) -> Self {
        self.network_monitor = Some(monitor);
        self
    }

    /// Sets the social-login SDK implementation (optional).
    pub fn federated_login(mut self, login: Arc<dyn FederatedLogin>) -> Self {
        self.federated_login = Some(login);
        self
    }

    /// Sets the options passed to the social-login SDK.
    pub fn federated_config(mut self, config: FederatedLoginConfig) -> Self {
        self.federated_config = Some(config);
        self
    }

    /// Attaches an event bus.
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Builds the final `AuthConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns `Ok(AuthConfig)` on success, or an error if:
    /// - A required bridge is missing and no platform default exists
    /// - The credential namespace is invalid
    pub fn build(self) -> Result<AuthConfig> {
        let project_id = self
            .project_id
            .or_else(|| std::env::var(PROJECT_ID_ENV).ok())
            .unwrap_or_default();

        let credential_namespace = self
            .credential_namespace
            .or_else(|| (!project_id.trim().is_empty()).then(|| project_id.clone()))
            .unwrap_or_else(|| DEFAULT_CREDENTIAL_NAMESPACE.to_string());

        let identity_provider = self
            .identity_provider
            .ok_or_else(identity_provider_missing_error)?;

        let settings_store = match self.settings_store {
            Some(store) => store,
            None => {
                let path = self.settings_path.unwrap_or_else(|| {
                    std::env::temp_dir().join(format!("{}-settings.db", credential_namespace))
                });
                provide_default_settings_store(path)?
            }
        };

        let network_monitor = match self.network_monitor {
            Some(monitor) => monitor,
            None => provide_default_network_monitor()?,
        };

        let federated_login = self
            .federated_login
            .unwrap_or_else(|| Arc::new(UnsupportedFederatedLogin));

        let config = AuthConfig {
            project_id,
            credential_namespace,
            identity_provider,
            settings_store,
            network_monitor,
            federated_login,
            federated_config: self.federated_config.unwrap_or_default(),
            event_bus: self.event_bus,
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{
        AuthStateListener, AuthUser, DependencyStatus, NetworkInfo, NetworkStatus,
        ProviderCredential, SubscriptionId,
    };

    struct StubProvider;

    #[async_trait]
    impl IdentityProvider for StubProvider {
        async fn check_and_fix_dependencies(&self) -> BridgeResult<DependencyStatus> {
            Ok(DependencyStatus::Available)
        }

        async fn sign_in_with_email_and_password(
            &self,
            email: &str,
            _password: &str,
        ) -> BridgeResult<AuthUser> {
            Ok(AuthUser::new("uid", email))
        }

        async fn create_user_with_email_and_password(
            &self,
            email: &str,
            _password: &str,
        ) -> BridgeResult<AuthUser> {
            Ok(AuthUser::new("uid", email))
        }

        fn federated_credential(&self, id_token: &str) -> ProviderCredential {
            ProviderCredential::new("google.com", id_token)
        }

        async fn sign_in_with_credential(
            &self,
            _credential: ProviderCredential,
        ) -> BridgeResult<AuthUser> {
            Ok(AuthUser::new("uid", "user@example.com"))
        }

        async fn sign_out(&self) -> BridgeResult<()> {
            Ok(())
        }

        async fn current_user(&self) -> Option<AuthUser> {
            None
        }

        fn subscribe_auth_state(&self, _listener: Arc<dyn AuthStateListener>) -> SubscriptionId {
            SubscriptionId::new()
        }

        fn unsubscribe_auth_state(&self, _id: SubscriptionId) {}
    }

    struct NullSettingsStore;

    #[async_trait]
    impl SettingsStore for NullSettingsStore {
        async fn set_string(&self, _key: &str, _value: &str) -> BridgeResult<()> {
            Ok(())
        }

        async fn get_string(&self, _key: &str) -> BridgeResult<Option<String>> {
            Ok(None)
        }

        async fn delete(&self, _key: &str) -> BridgeResult<()> {
            Ok(())
        }

        async fn list_keys(&self) -> BridgeResult<Vec<String>> {
            Ok(Vec::new())
        }

        async fn clear_all(&self) -> BridgeResult<()> {
            Ok(())
        }
    }

    struct AlwaysOnline;

    impl NetworkMonitor for AlwaysOnline {
        fn network_info(&self) -> BridgeResult<NetworkInfo> {
            Ok(NetworkInfo {
                status: NetworkStatus::Connected,
                network_type: None,
            })
        }
    }

    fn complete_builder() -> AuthConfigBuilder {
        AuthConfig::builder()
            .identity_provider(Arc::new(StubProvider))
            .settings_store(Arc::new(NullSettingsStore))
            .network_monitor(Arc::new(AlwaysOnline))
    }

    #[test]
    fn test_builder_requires_identity_provider() {
        let result = AuthConfig::builder()
            .project_id("demo")
            .settings_store(Arc::new(NullSettingsStore))
            .network_monitor(Arc::new(AlwaysOnline))
            .build();

        let err = result.unwrap_err();
        assert_eq!(err.missing_capability(), Some("IdentityProvider"));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_builder_requires_settings_store() {
        let result = AuthConfig::builder()
            .project_id("demo")
            .identity_provider(Arc::new(StubProvider))
            .network_monitor(Arc::new(AlwaysOnline))
            .build();

        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("SettingsStore"));
        assert!(err_msg.contains("credential persistence"));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_builder_requires_network_monitor() {
        let result = AuthConfig::builder()
            .project_id("demo")
            .identity_provider(Arc::new(StubProvider))
            .settings_store(Arc::new(NullSettingsStore))
            .build();

        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("NetworkMonitor"));
    }

    #[test]
    fn test_namespace_defaults_to_project_id() {
        let config = complete_builder().project_id("demo-project").build().unwrap();

        assert_eq!(config.project_id, "demo-project");
        assert_eq!(config.credential_namespace, "demo-project");
        assert!(config.has_project_id());
    }

    #[test]
    fn test_explicit_namespace_wins() {
        let config = complete_builder()
            .project_id("demo-project")
            .credential_namespace("app")
            .build()
            .unwrap();

        assert_eq!(config.credential_namespace, "app");
    }

    #[test]
    fn test_empty_project_id_is_accepted_by_builder() {
        let config = complete_builder().project_id("").build().unwrap();

        assert!(!config.has_project_id());
        assert_eq!(config.credential_namespace, DEFAULT_CREDENTIAL_NAMESPACE);
    }

    #[test]
    fn test_rejects_dotted_namespace() {
        let result = complete_builder()
            .project_id("demo")
            .credential_namespace("a.b")
            .build();

        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidNamespace { namespace, .. } if namespace == "a.b"
        ));
    }

    #[test]
    fn test_federated_login_defaults_to_unsupported() {
        let config = complete_builder().project_id("demo").build().unwrap();

        assert!(!config.federated_login.is_available());
        assert!(config.federated_config.request_id_token);
        assert!(config.federated_config.request_email);
        assert!(!config.federated_config.request_server_auth_code);
    }

    #[test]
    fn test_config_is_cloneable_and_debuggable() {
        let config = complete_builder()
            .project_id("demo")
            .event_bus(EventBus::new(8))
            .build()
            .unwrap();

        let cloned = config.clone();
        assert_eq!(cloned.project_id, config.project_id);
        assert!(format!("{:?}", cloned).contains("IdentityProvider { ... }"));
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_build_with_desktop_defaults() {
        let base = std::env::temp_dir().join(format!("core-runtime-test-{}", uuid::Uuid::new_v4()));
        let config = AuthConfig::builder()
            .project_id("demo")
            .identity_provider(Arc::new(StubProvider))
            .settings_path(base.join("settings.db"))
            .build()
            .expect("desktop defaults should succeed");

        let settings = config.settings_store.clone();
        let rt = tokio::runtime::Runtime::new().expect("runtime");
        rt.block_on(async {
            settings.set_string("demo.Email", "a@x.com").await.unwrap();
            let value = settings.get_string("demo.Email").await.unwrap();
            assert_eq!(value.as_deref(), Some("a@x.com"));
        });

        drop(config);
        let _ = std::fs::remove_dir_all(&base);
    }
}
