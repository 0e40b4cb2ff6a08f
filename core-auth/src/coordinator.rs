//! # Session Coordinator
//!
//! Owns the sign-in lifecycle against a remote [`IdentityProvider`].
//!
//! ## Overview
//!
//! A coordinator is constructed explicitly from an [`AuthConfig`] and
//! initialized once. Initialization validates the project identifier, then
//! resolves provider dependencies on a background task:
//!
//! 1. Reachability check (offline attempts stop here and can be retried)
//! 2. Single-slot lock, so concurrent attempts run one after another
//! 3. `check_and_fix_dependencies` on the provider
//! 4. On success, a single subscription to provider auth-state notifications
//!
//! Auth-state notifications keep `current_user` in sync and drive the
//! [`SessionEventHandler`]. Sign-in flows (saved credentials, email/password,
//! federated) are independent entry points that all finish by applying the
//! authenticated user.
//!
//! ## Usage
//!
//! ```ignore
//! use core_auth::{InitializeOptions, SessionCallbacks, SessionCoordinator};
//! use std::sync::Arc;
//!
//! let coordinator = SessionCoordinator::new(config);
//! let task = coordinator
//!     .initialize(InitializeOptions::new().with_event_handler(Arc::new(
//!         SessionCallbacks::new().on_signed_in(|user| println!("signed in: {}", user.id)),
//!     )))
//!     .await?;
//! task.wait().await;
//!
//! coordinator.sign_in_with_saved_information().await;
//! ```
//!
//! ## Error Reporting
//!
//! Provider and SDK failures never surface as `Err`. Depending on the flow
//! they are logged, reported through the result callback, or fired as a
//! `SignInError` event. Only configuration problems return [`AuthError`].

use crate::credential_store::CredentialStore;
use crate::error::{AuthError, Result};
use crate::handler::{EventBusHandler, SessionEventHandler};
use crate::logger::SessionLogger;
use crate::types::{
    CompletionCallback, InitializationStatus, InitializeOptions, ResolutionOutcome,
    ResolutionTask, ResultCallback, SavedCredentials,
};
use async_trait::async_trait;
use bridge_traits::{AuthStateListener, AuthUser, BridgeError, SubscriptionId};
use core_runtime::config::{AuthConfig, AuthConfigBuilder};
use core_runtime::logging::redact_if_sensitive;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use tokio::sync::{oneshot, watch, RwLock, Semaphore, SemaphorePermit};
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

const TAG_INIT: &str = "Initialize";
const TAG_AUTH_STATE: &str = "AuthState";
const TAG_SIGN_IN: &str = "SignIn";
const TAG_SIGN_OUT: &str = "SignOut";
const TAG_CREATE_USER: &str = "CreateUser";
const TAG_FEDERATED: &str = "FederatedSignIn";
const TAG_NETWORK: &str = "Network";
const TAG_CREDENTIALS: &str = "Credentials";

static TRACING_ONLY_LOGGER: SessionLogger = SessionLogger::tracing_only();

/// Client-side authentication session coordinator.
///
/// Cloning is cheap; clones share the same session.
#[derive(Clone)]
pub struct SessionCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    config: AuthConfig,
    credentials: CredentialStore,
    initialization_attempted: AtomicBool,
    configuration_failed: AtomicBool,
    initialized: AtomicBool,
    resolution_lock: Semaphore,
    current_user: RwLock<Option<AuthUser>>,
    event_handler: OnceLock<Arc<dyn SessionEventHandler>>,
    logger: OnceLock<SessionLogger>,
    status: watch::Sender<InitializationStatus>,
    subscription: Mutex<Option<SubscriptionId>>,
}

/// Marks the coordinator initialized, then releases the resolution lock.
struct ResolutionGuard<'a> {
    initialized: &'a AtomicBool,
    _permit: SemaphorePermit<'a>,
}

impl Drop for ResolutionGuard<'_> {
    fn drop(&mut self) {
        // Runs before the permit field is dropped
        self.initialized.store(true, Ordering::SeqCst);
    }
}

/// Relays provider notifications without keeping the coordinator alive.
struct AuthStateRelay {
    inner: Weak<Inner>,
}

#[async_trait]
impl AuthStateListener for AuthStateRelay {
    async fn on_auth_state_changed(&self, user: Option<AuthUser>) {
        match self.inner.upgrade() {
            Some(inner) => inner.handle_auth_state(user).await,
            None => debug!("Auth-state notification after coordinator was dropped"),
        }
    }
}

impl SessionCoordinator {
    pub fn new(config: AuthConfig) -> Self {
        let credentials = CredentialStore::new(
            Arc::clone(&config.settings_store),
            config.credential_namespace.clone(),
        );
        let (status, _) = watch::channel(InitializationStatus::NotStarted);

        Self {
            inner: Arc::new(Inner {
                config,
                credentials,
                initialization_attempted: AtomicBool::new(false),
                configuration_failed: AtomicBool::new(false),
                initialized: AtomicBool::new(false),
                resolution_lock: Semaphore::new(1),
                current_user: RwLock::new(None),
                event_handler: OnceLock::new(),
                logger: OnceLock::new(),
                status,
                subscription: Mutex::new(None),
            }),
        }
    }

    /// Build the configuration and construct a coordinator from it.
    pub fn from_builder(builder: AuthConfigBuilder) -> Result<Self> {
        Ok(Self::new(builder.build()?))
    }

    pub fn config(&self) -> &AuthConfig {
        &self.inner.config
    }

    /// Start the one-time initialization.
    ///
    /// # Errors
    ///
    /// - `AuthError::AlreadyInitialized` - a previous call already ran; nothing changes
    /// - `AuthError::MissingProjectId` - no project identifier is configured; this
    ///   coordinator can never become initialized
    #[instrument(skip_all)]
    pub async fn initialize(&self, options: InitializeOptions) -> Result<ResolutionTask> {
        let inner = &self.inner;

        if inner.initialization_attempted.swap(true, Ordering::SeqCst) {
            inner
                .logger()
                .warn(TAG_INIT, "Initialize was already called; ignoring this call");
            return Err(AuthError::AlreadyInitialized);
        }

        let _ = inner.logger.set(SessionLogger::new(options.logger));

        let handler = options.event_handler.or_else(|| {
            inner.config.event_bus.clone().map(|bus| {
                let handler: Arc<dyn SessionEventHandler> = Arc::new(EventBusHandler::new(bus));
                handler
            })
        });
        if let Some(handler) = handler {
            let _ = inner.event_handler.set(handler);
        }

        let logger = inner.logger();

        if !inner.config.has_project_id() {
            logger.error(
                TAG_INIT,
                "Identity provider project id is missing; session cannot be initialized",
            );
            inner.configuration_failed.store(true, Ordering::SeqCst);
            inner
                .status
                .send_replace(InitializationStatus::ConfigurationFailed);
            return Err(AuthError::MissingProjectId);
        }

        match inner.credentials.load().await {
            Ok(saved) => logger.info(
                TAG_INIT,
                &format!(
                    "Loaded saved credentials (user id: {}, email: {})",
                    saved.user_id.is_some(),
                    saved.email.is_some()
                ),
            ),
            Err(e) => logger.warn(TAG_INIT, &format!("Could not load saved credentials: {}", e)),
        }

        Ok(self.start_resolution())
    }

    /// Run dependency resolution again, e.g. after an offline attempt.
    ///
    /// After a missing project identifier the task finishes immediately with
    /// `ResolutionOutcome::ConfigurationFailed` and the provider is not called.
    pub fn retry(&self) -> ResolutionTask {
        self.inner.logger().info(TAG_INIT, "Retrying dependency resolution");
        self.start_resolution()
    }

    fn start_resolution(&self) -> ResolutionTask {
        let inner = Arc::clone(&self.inner);

        if inner.configuration_failed.load(Ordering::SeqCst) {
            inner.logger().warn(
                TAG_INIT,
                "Identity provider project id is missing; dependency resolution skipped",
            );
            return ResolutionTask::new(tokio::spawn(async {
                ResolutionOutcome::ConfigurationFailed
            }));
        }

        ResolutionTask::new(tokio::spawn(async move { inner.resolve_dependencies().await }))
    }

    /// Whether a dependency check has completed at least once.
    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> InitializationStatus {
        self.inner.status.borrow().clone()
    }

    pub fn watch_status(&self) -> watch::Receiver<InitializationStatus> {
        self.inner.status.subscribe()
    }

    pub async fn current_user(&self) -> Option<AuthUser> {
        self.inner.current_user.read().await.clone()
    }

    /// The signed-in user, or `AuthError::NotAuthenticated`.
    pub async fn require_user(&self) -> Result<AuthUser> {
        self.current_user().await.ok_or(AuthError::NotAuthenticated)
    }

    pub async fn saved_credentials(&self) -> Result<SavedCredentials> {
        self.inner.credentials.load().await
    }

    /// Forget the saved session.
    pub async fn clear_saved_credentials(&self) -> Result<()> {
        self.inner.credentials.clear().await
    }

    /// Query reachability. Logged; no state changes.
    pub fn check_internet_connection(&self) -> bool {
        let reachable = self.inner.config.network_monitor.is_reachable();
        self.inner.logger().info(
            TAG_NETWORK,
            if reachable {
                "Internet connection available"
            } else {
                "No internet connection"
            },
        );
        reachable
    }

    /// Sign out the current session.
    ///
    /// Returns `false` without contacting the provider when nobody is signed
    /// in. `current_user` is cleared by the provider's notification, not here.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> bool {
        let inner = &self.inner;
        let logger = inner.logger();

        if inner.current_user.read().await.is_none() {
            logger.warn(TAG_SIGN_OUT, "Sign out requested without an active session");
            return false;
        }

        if let Err(e) = inner.config.identity_provider.sign_out().await {
            logger.error(TAG_SIGN_OUT, &format!("Provider sign out failed: {}", e));
        } else {
            logger.info(TAG_SIGN_OUT, "Provider sign out requested");
        }

        let federated = Arc::clone(&inner.config.federated_login);
        if federated.is_available() {
            let logger = logger.clone();
            let _ = tokio::task::spawn_blocking(move || {
                if let Err(e) = federated.sign_out() {
                    logger.warn(TAG_SIGN_OUT, &format!("Federated SDK sign out failed: {}", e));
                }
            });
        }

        true
    }

    /// Resolve the email to use for a flow.
    ///
    /// Order: the candidate itself, the saved user id, the current user's
    /// email. The saved *user id* slot is consulted, not the saved email.
    /// When nothing is found a `SignInError` fires and `None` is returned.
    pub async fn validate_email(&self, candidate: &str) -> Option<String> {
        if !candidate.is_empty() {
            return Some(candidate.to_string());
        }

        let inner = &self.inner;
        if let Some(user_id) = inner.saved().await.user_id {
            return Some(user_id);
        }

        if let Some(user) = inner.current_user.read().await.as_ref() {
            if !user.email.is_empty() {
                return Some(user.email.clone());
            }
        }

        let message = "No email address available";
        inner.logger().error(TAG_SIGN_IN, message);
        inner.fire(|h| h.on_sign_in_error(message));
        None
    }

    /// Sign in with the saved email and password, if both exist.
    pub async fn sign_in_with_saved_information(&self) -> Option<AuthUser> {
        let saved = self.inner.saved().await;

        match saved.email_and_password() {
            Some((email, password)) => {
                self.sign_in_with_email_and_password(email, password, None)
                    .await
            }
            None => {
                self.inner
                    .logger()
                    .info(TAG_SIGN_IN, "No saved email and password to sign in with");
                None
            }
        }
    }

    /// Email/password sign-in.
    ///
    /// The pair is saved before the provider is called and kept whatever the
    /// outcome. Failures are logged and reported to `on_result`; no
    /// `SignInError` event fires.
    #[instrument(skip_all, fields(email = %redact_if_sensitive("email", email)))]
    pub async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
        on_result: Option<ResultCallback>,
    ) -> Option<AuthUser> {
        let inner = &self.inner;
        inner.persist_email_and_password(email, password).await;

        match inner
            .config
            .identity_provider
            .sign_in_with_email_and_password(email, password)
            .await
        {
            Ok(user) => {
                inner.apply_user(&user).await;
                inner.logger().info(
                    TAG_SIGN_IN,
                    &format!("Signed in with email and password (user id: {})", user.id),
                );
                inner.fire(|h| h.on_signed_in(&user));
                report(on_result, true);
                Some(user)
            }
            Err(e) => {
                inner.logger().error(
                    TAG_SIGN_IN,
                    &format!("Email and password sign in failed: {}", e),
                );
                report(on_result, false);
                None
            }
        }
    }

    /// Create an account on a background task.
    ///
    /// The pair is saved before the task starts. Cancellation and failure are
    /// only logged. On success the user is applied, `AccountCreated` fires and
    /// `on_complete` receives the email.
    #[instrument(skip_all, fields(email = %redact_if_sensitive("email", email)))]
    pub async fn create_user_with_email_and_password(
        &self,
        email: &str,
        password: &str,
        on_complete: Option<CompletionCallback>,
    ) -> JoinHandle<Option<AuthUser>> {
        self.inner.persist_email_and_password(email, password).await;

        let inner = Arc::clone(&self.inner);
        let email = email.to_string();
        let password = password.to_string();

        tokio::spawn(async move {
            let result = inner
                .config
                .identity_provider
                .create_user_with_email_and_password(&email, &password)
                .await;

            match result {
                Ok(user) => {
                    inner.apply_user(&user).await;
                    inner.logger().info(
                        TAG_CREATE_USER,
                        &format!("Account created (user id: {})", user.id),
                    );
                    inner.fire(|h| h.on_account_created(&user));
                    if let Some(on_complete) = on_complete {
                        on_complete(email);
                    }
                    Some(user)
                }
                Err(BridgeError::Cancelled) => {
                    inner
                        .logger()
                        .error(TAG_CREATE_USER, "Account creation was cancelled");
                    None
                }
                Err(e) => {
                    inner
                        .logger()
                        .error(TAG_CREATE_USER, &format!("Account creation failed: {}", e));
                    None
                }
            }
        })
    }

    /// Interactive sign-in through the platform social-login SDK.
    ///
    /// Returns `None` without calling `on_result` when no SDK is available.
    #[instrument(skip_all)]
    pub async fn sign_in_with_federated_provider(
        &self,
        on_result: Option<ResultCallback>,
    ) -> Option<AuthUser> {
        let inner = &self.inner;
        let logger = inner.logger();
        let login = Arc::clone(&inner.config.federated_login);

        if !login.is_available() {
            logger.info(TAG_FEDERATED, "Federated login is not available on this platform");
            return None;
        }

        if let Err(e) = login.configure(&inner.config.federated_config) {
            logger.error(TAG_FEDERATED, &format!("Federated login setup failed: {}", e));
            report(on_result, false);
            return None;
        }

        let (tx, rx) = oneshot::channel();
        login.authenticate(Box::new(move |success| {
            let _ = tx.send(success);
        }));
        // A dropped callback counts as failure
        let authenticated = rx.await.unwrap_or(false);

        if !authenticated {
            logger.error(TAG_FEDERATED, "Federated login failed or was cancelled");
            report(on_result, false);
            return None;
        }

        let Some(id_token) = login.id_token() else {
            logger.error(TAG_FEDERATED, "Federated login returned no identity token");
            report(on_result, false);
            return None;
        };
        let email = login.user_email().unwrap_or_default();

        self.sign_in_with_credential(&id_token, &email, on_result)
            .await
    }

    /// Exchange a federated identity token and sign in with it.
    ///
    /// Failures fire `SignInError` and report `false` to `on_result`.
    #[instrument(skip_all, fields(email = %redact_if_sensitive("email", email)))]
    pub async fn sign_in_with_credential(
        &self,
        id_token: &str,
        email: &str,
        on_result: Option<ResultCallback>,
    ) -> Option<AuthUser> {
        let inner = &self.inner;
        let provider = &inner.config.identity_provider;
        let credential = provider.federated_credential(id_token);

        match provider.sign_in_with_credential(credential).await {
            Ok(user) => {
                inner.apply_user(&user).await;
                inner.logger().info(
                    TAG_FEDERATED,
                    &format!("Signed in with federated credential (user id: {})", user.id),
                );
                inner.fire(|h| h.on_signed_in(&user));
                report(on_result, true);
                Some(user)
            }
            Err(e) => {
                let message = format!("Federated credential sign in failed: {}", e);
                inner.logger().error(TAG_FEDERATED, &message);
                inner.fire(|h| h.on_sign_in_error(&message));
                report(on_result, false);
                None
            }
        }
    }

    /// Stop listening to provider notifications.
    pub fn shutdown(&self) {
        let subscription = self
            .inner
            .subscription
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        if let Some(id) = subscription {
            self.inner
                .config
                .identity_provider
                .unsubscribe_auth_state(id);
            self.inner
                .logger()
                .info(TAG_INIT, "Unsubscribed from auth-state notifications");
        }
    }
}

impl std::fmt::Debug for SessionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCoordinator")
            .field("config", &self.inner.config)
            .field("initialized", &self.is_initialized())
            .field("status", &self.status())
            .finish()
    }
}

impl Inner {
    fn logger(&self) -> &SessionLogger {
        self.logger.get().unwrap_or(&TRACING_ONLY_LOGGER)
    }

    fn fire(&self, notify: impl FnOnce(&dyn SessionEventHandler)) {
        if let Some(handler) = self.event_handler.get() {
            notify(handler.as_ref());
        }
    }

    async fn resolve_dependencies(self: &Arc<Self>) -> ResolutionOutcome {
        let logger = self.logger();

        if !self.is_reachable().await {
            logger.error(TAG_INIT, "No internet connection; dependency check skipped");
            self.publish_offline();
            self.fire(|h| h.on_internet_connection_error());
            return ResolutionOutcome::Offline;
        }

        let permit = match self.resolution_lock.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                return ResolutionOutcome::DependencyFailed(
                    "Dependency resolution lock is closed".to_string(),
                )
            }
        };
        let _guard = ResolutionGuard {
            initialized: &self.initialized,
            _permit: permit,
        };
        self.status.send_replace(InitializationStatus::Resolving);

        let outcome = match self.config.identity_provider.check_and_fix_dependencies().await {
            Ok(status) if status.is_available() => {
                logger.info(TAG_INIT, "Identity provider dependencies are available");
                self.subscribe_auth_state();
                ResolutionOutcome::Ready
            }
            Ok(status) => {
                let message = format!("Could not resolve identity provider dependencies: {}", status);
                logger.error(TAG_INIT, &message);
                self.fire(|h| h.on_sign_in_error(&message));
                ResolutionOutcome::DependencyFailed(message)
            }
            Err(e) => {
                let message = format!("Identity provider dependency check failed: {}", e);
                logger.error(TAG_INIT, &message);
                self.fire(|h| h.on_sign_in_error(&message));
                ResolutionOutcome::DependencyFailed(message)
            }
        };

        self.status.send_replace((&outcome).into());
        outcome
    }

    /// Host monitors may block, so the query runs off the async workers.
    async fn is_reachable(&self) -> bool {
        let monitor = Arc::clone(&self.config.network_monitor);
        match tokio::task::spawn_blocking(move || monitor.is_reachable()).await {
            Ok(reachable) => reachable,
            Err(e) => {
                self.logger()
                    .warn(TAG_NETWORK, &format!("Reachability check aborted: {}", e));
                false
            }
        }
    }

    /// `Offline` only describes a coordinator that never resolved, and never
    /// replaces an attempt that is in flight.
    fn publish_offline(&self) {
        if self.initialized.load(Ordering::SeqCst) {
            return;
        }
        self.status.send_if_modified(|status| match status {
            InitializationStatus::Resolving | InitializationStatus::Offline => false,
            _ => {
                *status = InitializationStatus::Offline;
                true
            }
        });
    }

    fn subscribe_auth_state(self: &Arc<Self>) {
        let mut subscription = self
            .subscription
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if subscription.is_some() {
            return;
        }

        let relay = Arc::new(AuthStateRelay {
            inner: Arc::downgrade(self),
        });
        *subscription = Some(self.config.identity_provider.subscribe_auth_state(relay));
        self.logger()
            .info(TAG_AUTH_STATE, "Subscribed to auth-state notifications");
    }

    async fn handle_auth_state(&self, user: Option<AuthUser>) {
        match user {
            None => {
                *self.current_user.write().await = None;
                self.logger().info(TAG_AUTH_STATE, "Signed out");
                self.fire(|h| h.on_signed_out());
            }
            Some(user) => {
                *self.current_user.write().await = Some(user.clone());
                self.logger().info(
                    TAG_AUTH_STATE,
                    &format!(
                        "Signed in as {} (user id: {})",
                        redact_if_sensitive("email", &user.email),
                        user.id
                    ),
                );
                self.fire(|h| h.on_signed_in(&user));
            }
        }
    }

    async fn saved(&self) -> SavedCredentials {
        match self.credentials.load().await {
            Ok(saved) => saved,
            Err(e) => {
                self.logger()
                    .warn(TAG_CREDENTIALS, &format!("Could not read saved credentials: {}", e));
                SavedCredentials::default()
            }
        }
    }

    async fn persist_email_and_password(&self, email: &str, password: &str) {
        if let Err(e) = self.credentials.save_email_and_password(email, password).await {
            self.logger()
                .warn(TAG_CREDENTIALS, &format!("Could not save email and password: {}", e));
        }
    }

    async fn apply_user(&self, user: &AuthUser) {
        *self.current_user.write().await = Some(user.clone());

        if let Err(e) = self.credentials.save_user(user).await {
            self.logger()
                .warn(TAG_CREDENTIALS, &format!("Could not save signed-in user: {}", e));
        }
    }
}

fn report(on_result: Option<ResultCallback>, success: bool) {
    if let Some(on_result) = on_result {
        on_result(success);
    }
}
