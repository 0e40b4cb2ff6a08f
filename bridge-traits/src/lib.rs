//! # Host Bridge Traits
//!
//! Collaborator contracts that the session core requires from its host.
//!
//! ## Overview
//!
//! This crate defines the boundary between the authentication core and the
//! outside world. Each trait is a capability the core depends on but does not
//! implement itself: the remote identity service, the platform social-login
//! SDK, persisted preferences, network reachability, and host logging.
//!
//! ## Traits
//!
//! ### Identity
//! - [`IdentityProvider`](identity::IdentityProvider) - Remote sign-in, account creation, auth-state stream
//! - [`FederatedLogin`](federated::FederatedLogin) - Callback-based social-login SDK
//!
//! ### Storage
//! - [`SettingsStore`](storage::SettingsStore) - Key-value preferences storage
//!
//! ### Platform Integration
//! - [`NetworkMonitor`](network::NetworkMonitor) - Synchronous reachability signal
//! - [`LoggerSink`](log::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Capability        | Desktop (`bridge-desktop`)  | Mobile            |
//! |-------------------|-----------------------------|-------------------|
//! | SettingsStore     | `SqliteSettingsStore`       | Host adapter      |
//! | NetworkMonitor    | `DesktopNetworkMonitor`     | Host adapter      |
//! | FederatedLogin    | `UnsupportedFederatedLogin` | Native SDK        |
//! | IdentityProvider  | Host adapter                | Host adapter      |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert platform errors into it with an actionable message, and
//! report user-cancelled operations as `BridgeError::Cancelled`.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared
//! across async tasks behind `Arc`.

pub mod error;
pub mod federated;
pub mod identity;
pub mod log;
pub mod network;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use federated::{
    AuthenticateCallback, FederatedLogin, FederatedLoginConfig, UnsupportedFederatedLogin,
};
pub use identity::{
    AuthStateListener, AuthUser, DependencyStatus, IdentityProvider, ProviderCredential,
    SubscriptionId,
};
pub use log::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use network::{NetworkInfo, NetworkMonitor, NetworkStatus, NetworkType};
pub use storage::SettingsStore;
