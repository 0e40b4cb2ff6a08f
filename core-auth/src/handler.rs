//! Session event surface.
//!
//! The coordinator reports state transitions through a [`SessionEventHandler`].
//! Every method has a no-op default, so hosts override only what they need.
//! Events fire after the state change they describe.
//!
//! Two ready-made handlers are provided:
//! - [`EventBusHandler`] forwards events onto the runtime [`EventBus`].
//! - [`SessionCallbacks`] wraps individual closures.

use bridge_traits::AuthUser;
use core_runtime::events::{AuthEvent, ConnectivityEvent, CoreEvent, EventBus};
use std::fmt;
use tracing::debug;

/// Receives session events.
pub trait SessionEventHandler: Send + Sync {
    /// The network was unreachable when dependency resolution started.
    fn on_internet_connection_error(&self) {}

    /// Dependency resolution, email validation or federated sign-in failed.
    fn on_sign_in_error(&self, _message: &str) {}

    /// A provider-confirmed user is signed in.
    fn on_signed_in(&self, _user: &AuthUser) {}

    /// The provider reported that no user is signed in.
    fn on_signed_out(&self) {}

    /// A new account was created.
    fn on_account_created(&self, _user: &AuthUser) {}
}

/// Forwards session events to an [`EventBus`].
///
/// Emission failures (no subscribers) are ignored.
#[derive(Debug, Clone)]
pub struct EventBusHandler {
    event_bus: EventBus,
}

impl EventBusHandler {
    pub fn new(event_bus: EventBus) -> Self {
        Self { event_bus }
    }

    fn emit(&self, event: CoreEvent) {
        if self.event_bus.emit(event).is_err() {
            debug!("No event bus subscribers for session event");
        }
    }
}

impl SessionEventHandler for EventBusHandler {
    fn on_internet_connection_error(&self) {
        self.emit(CoreEvent::Connectivity(
            ConnectivityEvent::InternetConnectionError,
        ));
    }

    fn on_sign_in_error(&self, message: &str) {
        self.emit(CoreEvent::Auth(AuthEvent::SignInError {
            message: message.to_string(),
        }));
    }

    fn on_signed_in(&self, user: &AuthUser) {
        self.emit(CoreEvent::Auth(AuthEvent::SignedIn {
            user_id: user.id.clone(),
            email: user.email.clone(),
        }));
    }

    fn on_signed_out(&self) {
        self.emit(CoreEvent::Auth(AuthEvent::SignedOut));
    }

    fn on_account_created(&self, user: &AuthUser) {
        self.emit(CoreEvent::Auth(AuthEvent::AccountCreated {
            user_id: user.id.clone(),
            email: user.email.clone(),
        }));
    }
}

type Notify = Box<dyn Fn() + Send + Sync>;
type NotifyMessage = Box<dyn Fn(&str) + Send + Sync>;
type NotifyUser = Box<dyn Fn(&AuthUser) + Send + Sync>;

/// Closure-based handler; unset events are ignored.
///
/// ```ignore
/// let callbacks = SessionCallbacks::new()
///     .on_signed_in(|user| println!("welcome {}", user.id))
///     .on_signed_out(|| println!("bye"));
/// ```
#[derive(Default)]
pub struct SessionCallbacks {
    internet_connection_error: Option<Notify>,
    sign_in_error: Option<NotifyMessage>,
    signed_in: Option<NotifyUser>,
    signed_out: Option<Notify>,
    account_created: Option<NotifyUser>,
}

impl SessionCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_internet_connection_error(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.internet_connection_error = Some(Box::new(f));
        self
    }

    pub fn on_sign_in_error(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.sign_in_error = Some(Box::new(f));
        self
    }

    pub fn on_signed_in(mut self, f: impl Fn(&AuthUser) + Send + Sync + 'static) -> Self {
        self.signed_in = Some(Box::new(f));
        self
    }

    pub fn on_signed_out(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.signed_out = Some(Box::new(f));
        self
    }

    pub fn on_account_created(mut self, f: impl Fn(&AuthUser) + Send + Sync + 'static) -> Self {
        self.account_created = Some(Box::new(f));
        self
    }
}

impl SessionEventHandler for SessionCallbacks {
    fn on_internet_connection_error(&self) {
        if let Some(f) = &self.internet_connection_error {
            f();
        }
    }

    fn on_sign_in_error(&self, message: &str) {
        if let Some(f) = &self.sign_in_error {
            f(message);
        }
    }

    fn on_signed_in(&self, user: &AuthUser) {
        if let Some(f) = &self.signed_in {
            f(user);
        }
    }

    fn on_signed_out(&self) {
        if let Some(f) = &self.signed_out {
            f();
        }
    }

    fn on_account_created(&self, user: &AuthUser) {
        if let Some(f) = &self.account_created {
            f(user);
        }
    }
}

impl fmt::Debug for SessionCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCallbacks")
            .field(
                "internet_connection_error",
                &self.internet_connection_error.is_some(),
            )
            .field("sign_in_error", &self.sign_in_error.is_some())
            .field("signed_in", &self.signed_in.is_some())
            .field("signed_out", &self.signed_out.is_some())
            .field("account_created", &self.account_created.is_some())
            .finish()
    }
}
