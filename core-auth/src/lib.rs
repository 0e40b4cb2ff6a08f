//! # Authentication Session Module
//!
//! Client-side session coordinator for a remote identity provider.
//!
//! ## Overview
//!
//! This crate manages the sign-in/sign-out lifecycle: one-time initialization
//! with a serialized dependency check, the current authenticated user,
//! persisted last-known credentials for session resumption, and notification
//! of state transitions to the host.
//!
//! ## Features
//!
//! - Email/password, saved-credential and federated (social login) sign-in
//! - Account creation on a background task
//! - Auth-state notifications mirrored into `current_user`
//! - Event delivery through a handler trait, closures, or the runtime event bus
//! - Observable initialization status

pub mod coordinator;
pub mod credential_store;
pub mod error;
pub mod handler;
pub mod logger;
pub mod types;

pub use coordinator::SessionCoordinator;
pub use credential_store::CredentialStore;
pub use error::{AuthError, Result};
pub use handler::{EventBusHandler, SessionCallbacks, SessionEventHandler};
pub use logger::SessionLogger;
pub use types::{
    CompletionCallback, InitializationStatus, InitializeOptions, ResolutionOutcome,
    ResolutionTask, ResultCallback, SavedCredentials,
};
