//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `SettingsStore` using a SQLite-backed key-value table
//! - `NetworkMonitor` using a TCP reachability probe
//!
//! Desktop targets ship no social-login SDK; hosts pair these adapters with
//! [`UnsupportedFederatedLogin`](bridge_traits::UnsupportedFederatedLogin).
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DesktopNetworkMonitor, SqliteSettingsStore};
//! use bridge_traits::NetworkMonitor;
//!
//! #[tokio::main]
//! async fn main() {
//!     let settings = SqliteSettingsStore::new("settings.db".into()).await.unwrap();
//!     let network = DesktopNetworkMonitor::new();
//!     println!("online: {}", network.is_reachable());
//! }
//! ```

mod network;
mod settings;

pub use network::DesktopNetworkMonitor;
pub use settings::SqliteSettingsStore;
