//! Network Reachability Abstraction
//!
//! Provides a synchronous connectivity signal. The session coordinator only
//! needs a yes/no answer before it talks to the identity provider, so the
//! query never suspends.

use crate::error::Result;

/// Network connection type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkType {
    /// Cellular/mobile data connection
    Cellular,
    /// WiFi connection
    WiFi,
    /// Ethernet connection
    Ethernet,
    /// Other or unknown connection type
    Other,
}

/// Network connection status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    /// Connected to network
    Connected,
    /// Not connected to any network
    Disconnected,
    /// Connection status unknown or indeterminate
    Indeterminate,
}

/// Network information
#[derive(Debug, Clone)]
pub struct NetworkInfo {
    pub status: NetworkStatus,
    pub network_type: Option<NetworkType>,
}

impl NetworkInfo {
    /// Info describing an unreachable network.
    pub fn disconnected() -> Self {
        Self {
            status: NetworkStatus::Disconnected,
            network_type: None,
        }
    }
}

/// Host-provided reachability signal.
///
/// # Platform Support
///
/// - **Desktop**: TCP probe against a well-known endpoint
/// - **iOS**: Network framework, Reachability
/// - **Android**: ConnectivityManager
///
/// # Example
///
/// ```ignore
/// use bridge_traits::network::NetworkMonitor;
///
/// fn can_sign_in(monitor: &dyn NetworkMonitor) -> bool {
///     monitor.is_reachable()
/// }
/// ```
pub trait NetworkMonitor: Send + Sync {
    /// Get current network information
    fn network_info(&self) -> Result<NetworkInfo>;

    /// Whether the network is currently reachable.
    ///
    /// Errors and indeterminate states count as unreachable.
    fn is_reachable(&self) -> bool {
        matches!(
            self.network_info(),
            Ok(NetworkInfo {
                status: NetworkStatus::Connected,
                ..
            })
        )
    }
}
