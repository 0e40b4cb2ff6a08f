//! Network Reachability Implementation

use bridge_traits::{
    error::Result,
    network::{NetworkInfo, NetworkMonitor, NetworkStatus, NetworkType},
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{debug, warn};

const DEFAULT_PROBE_ADDR: ([u8; 4], u16) = ([8, 8, 8, 8], 53);
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);
const DEFAULT_MAX_AGE: Duration = Duration::from_secs(10);

/// Desktop network monitor implementation
///
/// Reachability is decided by opening a TCP connection to a well-known
/// endpoint (public DNS by default) with a short timeout. Results are cached
/// for `max_age`.
///
/// `network_info` never blocks an async worker:
/// - multi-thread runtime: the probe runs under `block_in_place`
/// - current-thread runtime: the cached result is returned and a refresh is
///   spawned; call [`refresh`](Self::refresh) once at startup there
/// - no runtime: the probe runs on a throwaway current-thread runtime
///
/// Note: Platform-specific implementations (Linux netlink, macOS SystemConfiguration,
/// Windows WinAPI) would be more robust but require additional dependencies.
pub struct DesktopNetworkMonitor {
    probe: Probe,
    max_age: Duration,
    cached: Arc<Mutex<Option<(NetworkInfo, Instant)>>>,
    refreshing: Arc<AtomicBool>,
}

#[derive(Clone, Copy)]
struct Probe {
    addr: SocketAddr,
    timeout: Duration,
}

impl Probe {
    async fn run(self) -> NetworkInfo {
        let status = match tokio::time::timeout(
            self.timeout,
            tokio::net::TcpStream::connect(self.addr),
        )
        .await
        {
            Ok(Ok(_)) => NetworkStatus::Connected,
            Ok(Err(_)) => NetworkStatus::Disconnected,
            Err(_) => NetworkStatus::Disconnected,
        };

        NetworkInfo {
            status,
            network_type: if status == NetworkStatus::Connected {
                // Can't distinguish Ethernet/WiFi without platform-specific APIs
                Some(NetworkType::Other)
            } else {
                None
            },
        }
    }
}

impl DesktopNetworkMonitor {
    /// Create a new network monitor probing the default endpoint
    pub fn new() -> Self {
        Self::with_probe(SocketAddr::from(DEFAULT_PROBE_ADDR), DEFAULT_PROBE_TIMEOUT)
    }

    /// Create a monitor probing a custom endpoint
    pub fn with_probe(probe_addr: SocketAddr, timeout: Duration) -> Self {
        Self {
            probe: Probe {
                addr: probe_addr,
                timeout,
            },
            max_age: DEFAULT_MAX_AGE,
            cached: Arc::new(Mutex::new(None)),
            refreshing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// How long a probe result is reused before probing again
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Last probe result, if any probe has run
    pub fn last_info(&self) -> Option<NetworkInfo> {
        self.cached
            .lock()
            .ok()
            .and_then(|cached| cached.as_ref().map(|(info, _)| info.clone()))
    }

    /// Probe now and cache the result
    pub async fn refresh(&self) -> NetworkInfo {
        let info = self.probe.run().await;
        store(&self.cached, self.probe.addr, &info);
        info
    }

    fn fresh(&self) -> Option<NetworkInfo> {
        let cached = self.cached.lock().ok()?;
        match cached.as_ref() {
            Some((info, at)) if at.elapsed() < self.max_age => Some(info.clone()),
            _ => None,
        }
    }

    fn spawn_refresh(&self, handle: &Handle) {
        if self.refreshing.swap(true, Ordering::SeqCst) {
            return;
        }

        let probe = self.probe;
        let cached = Arc::clone(&self.cached);
        let refreshing = Arc::clone(&self.refreshing);
        handle.spawn(async move {
            let info = probe.run().await;
            store(&cached, probe.addr, &info);
            refreshing.store(false, Ordering::SeqCst);
        });
    }

    fn probe_blocking(&self) -> Option<NetworkInfo> {
        match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => Some(runtime.block_on(self.refresh())),
            Err(e) => {
                warn!(error = %e, "Could not start a runtime for the reachability probe");
                None
            }
        }
    }
}

fn store(cached: &Mutex<Option<(NetworkInfo, Instant)>>, addr: SocketAddr, info: &NetworkInfo) {
    if let Ok(mut cached) = cached.lock() {
        *cached = Some((info.clone(), Instant::now()));
    }
    debug!(status = ?info.status, probe = %addr, "Network info updated");
}

impl Default for DesktopNetworkMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkMonitor for DesktopNetworkMonitor {
    fn network_info(&self) -> Result<NetworkInfo> {
        if let Some(info) = self.fresh() {
            return Ok(info);
        }

        let info = match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => Some(
                tokio::task::block_in_place(|| handle.block_on(self.refresh())),
            ),
            Ok(handle) => {
                self.spawn_refresh(&handle);
                self.last_info()
            }
            Err(_) => self.probe_blocking(),
        };

        Ok(info.unwrap_or(NetworkInfo {
            status: NetworkStatus::Indeterminate,
            network_type: None,
        }))
    }
}
