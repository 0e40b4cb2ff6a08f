//! Workspace facade crate.
//!
//! Re-exports the session crates so a host application can depend on
//! `session-workspace` alone. The `desktop-shims` feature (on by default)
//! enables the SQLite settings store and TCP reachability probe as defaults
//! for `AuthConfig::builder()`.

pub use bridge_traits;
pub use core_auth;
pub use core_runtime;

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop;

/// Types most hosts need to wire up a session.
pub mod prelude {
    pub use bridge_traits::{
        AuthStateListener, AuthUser, DependencyStatus, FederatedLogin, FederatedLoginConfig,
        IdentityProvider, LoggerSink, NetworkMonitor, ProviderCredential, SettingsStore,
        SubscriptionId,
    };
    pub use core_auth::{
        AuthError, EventBusHandler, InitializationStatus, InitializeOptions, ResolutionOutcome,
        SessionCallbacks, SessionCoordinator, SessionEventHandler,
    };
    pub use core_runtime::config::AuthConfig;
    pub use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
    pub use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
}
