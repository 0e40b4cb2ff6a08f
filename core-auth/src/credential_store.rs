//! Saved credential persistence
//!
//! Stores the last-known user id, email, password and photo URL in the host
//! [`SettingsStore`] so a session can be resumed on the next launch.
//!
//! ## Keys
//!
//! Values live under `"{namespace}.UserId"`, `"{namespace}.Email"`,
//! `"{namespace}.Password"` and `"{namespace}.PhotoUrl"`.
//!
//! ## Security
//!
//! - The password is never logged or shown by `Debug`
//! - The settings store is trusted with the password as-is; hosts that need
//!   encryption at rest should inject an encrypting `SettingsStore`

use crate::error::{AuthError, Result};
use crate::types::SavedCredentials;
use bridge_traits::{AuthUser, BridgeError, SettingsStore};
use core_runtime::logging::redact_if_sensitive;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const USER_ID_KEY: &str = "UserId";
const EMAIL_KEY: &str = "Email";
const PASSWORD_KEY: &str = "Password";
const PHOTO_URL_KEY: &str = "PhotoUrl";

/// Namespaced view over the settings store for saved credentials.
pub struct CredentialStore {
    settings: Arc<dyn SettingsStore>,
    namespace: String,
    // Keeps multi-key writes from interleaving
    write_lock: Mutex<()>,
}

impl CredentialStore {
    pub fn new(settings: Arc<dyn SettingsStore>, namespace: impl Into<String>) -> Self {
        Self {
            settings,
            namespace: namespace.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn key(&self, field: &str) -> String {
        format!("{}.{}", self.namespace, field)
    }

    /// Read every saved field. Missing and empty values become `None`.
    pub async fn load(&self) -> Result<SavedCredentials> {
        let saved = SavedCredentials {
            user_id: self.read(USER_ID_KEY).await?,
            email: self.read(EMAIL_KEY).await?,
            password: self.read(PASSWORD_KEY).await?,
            photo_url: self.read(PHOTO_URL_KEY).await?,
        };

        debug!(
            namespace = %self.namespace,
            has_user_id = saved.user_id.is_some(),
            has_email = saved.email.is_some(),
            has_password = saved.password.is_some(),
            "Loaded saved credentials"
        );

        Ok(saved)
    }

    /// Persist an email/password pair.
    ///
    /// The password is written first. If the email write then fails, the
    /// previous password is put back so the saved pair stays consistent.
    pub async fn save_email_and_password(&self, email: &str, password: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let previous_password = self.read(PASSWORD_KEY).await?;
        self.write(PASSWORD_KEY, password).await?;

        if let Err(e) = self.write(EMAIL_KEY, email).await {
            let restored = match previous_password {
                Some(previous) => self.write(PASSWORD_KEY, &previous).await,
                None => {
                    let key = self.key(PASSWORD_KEY);
                    self.settings
                        .delete(&key)
                        .await
                        .map_err(|e| storage_error(&key, e))
                }
            };
            if restored.is_err() {
                warn!(namespace = %self.namespace, "Could not restore the previous password");
            }
            return Err(e);
        }

        info!(
            namespace = %self.namespace,
            email = %redact_if_sensitive("email", email),
            "Saved email and password"
        );
        Ok(())
    }

    /// Persist the id and photo URL of an authenticated user.
    ///
    /// A user without a photo clears any previously saved URL.
    pub async fn save_user(&self, user: &AuthUser) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        self.write(USER_ID_KEY, &user.id).await?;
        self.write(PHOTO_URL_KEY, user.photo_url.as_deref().unwrap_or_default())
            .await?;

        debug!(namespace = %self.namespace, user_id = %user.id, "Saved user");
        Ok(())
    }

    /// Forget every saved field.
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        for field in [USER_ID_KEY, EMAIL_KEY, PASSWORD_KEY, PHOTO_URL_KEY] {
            let key = self.key(field);
            self.settings
                .delete(&key)
                .await
                .map_err(|e| storage_error(&key, e))?;
        }

        info!(namespace = %self.namespace, "Cleared saved credentials");
        Ok(())
    }

    async fn read(&self, field: &str) -> Result<Option<String>> {
        let key = self.key(field);
        let value = self
            .settings
            .get_string(&key)
            .await
            .map_err(|e| storage_error(&key, e))?;

        Ok(value.filter(|v| !v.is_empty()))
    }

    async fn write(&self, field: &str, value: &str) -> Result<()> {
        let key = self.key(field);
        self.settings
            .set_string(&key, value)
            .await
            .map_err(|e| storage_error(&key, e))
    }
}

fn storage_error(key: &str, error: BridgeError) -> AuthError {
    warn!(key = %key, error = %error, "Settings store operation failed");
    AuthError::Storage(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemorySettings {
        values: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl SettingsStore for MemorySettings {
        async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
            self.values
                .lock()
                .await
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
            Ok(self.values.lock().await.get(key).cloned())
        }

        async fn delete(&self, key: &str) -> BridgeResult<()> {
            self.values.lock().await.remove(key);
            Ok(())
        }

        async fn list_keys(&self) -> BridgeResult<Vec<String>> {
            Ok(self.values.lock().await.keys().cloned().collect())
        }

        async fn clear_all(&self) -> BridgeResult<()> {
            self.values.lock().await.clear();
            Ok(())
        }
    }

    struct BrokenSettings;

    #[async_trait]
    impl SettingsStore for BrokenSettings {
        async fn set_string(&self, _key: &str, _value: &str) -> BridgeResult<()> {
            Err(BridgeError::Storage("disk full".to_string()))
        }

        async fn get_string(&self, _key: &str) -> BridgeResult<Option<String>> {
            Err(BridgeError::Storage("disk full".to_string()))
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

    /// Rejects writes to one key.
    struct RejectingKey {
        inner: MemorySettings,
        rejected: &'static str,
    }

    #[async_trait]
    impl SettingsStore for RejectingKey {
        async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
            if key == self.rejected {
                return Err(BridgeError::Storage("read-only key".to_string()));
            }
            self.inner.set_string(key, value).await
        }

        async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
            self.inner.get_string(key).await
        }

        async fn delete(&self, key: &str) -> BridgeResult<()> {
            self.inner.delete(key).await
        }

        async fn list_keys(&self) -> BridgeResult<Vec<String>> {
            self.inner.list_keys().await
        }

        async fn clear_all(&self) -> BridgeResult<()> {
            self.inner.clear_all().await
        }
    }

    #[tokio::test]
    async fn test_failed_email_write_restores_previous_password() {
        let settings = MemorySettings::default();
        settings.set_string("demo.Password", "old-pw").await.unwrap();
        let store = CredentialStore::new(
            Arc::new(RejectingKey {
                inner: settings,
                rejected: "demo.Email",
            }),
            "demo",
        );

        assert!(store.save_email_and_password("a@x.com", "new-pw").await.is_err());

        let saved = store.load().await.unwrap();
        assert_eq!(saved.password.as_deref(), Some("old-pw"));
        assert!(saved.email.is_none());
    }

    #[tokio::test]
    async fn test_failed_email_write_without_previous_password() {
        let store = CredentialStore::new(
            Arc::new(RejectingKey {
                inner: MemorySettings::default(),
                rejected: "demo.Email",
            }),
            "demo",
        );

        assert!(store.save_email_and_password("a@x.com", "new-pw").await.is_err());
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let settings = Arc::new(MemorySettings::default());
        let store = CredentialStore::new(settings.clone(), "demo");

        store.save_email_and_password("a@x.com", "pw").await.unwrap();
        store
            .save_user(&AuthUser::new("uid-1", "a@x.com").with_photo_url("https://x/p.png"))
            .await
            .unwrap();

        let saved = store.load().await.unwrap();
        assert_eq!(saved.user_id.as_deref(), Some("uid-1"));
        assert_eq!(saved.email_and_password(), Some(("a@x.com", "pw")));
        assert_eq!(saved.photo_url.as_deref(), Some("https://x/p.png"));

        let mut keys = settings.list_keys().await.unwrap();
        keys.sort();
        assert_eq!(
            keys,
            vec!["demo.Email", "demo.Password", "demo.PhotoUrl", "demo.UserId"]
        );
    }

    #[tokio::test]
    async fn test_empty_values_load_as_none() {
        let settings = Arc::new(MemorySettings::default());
        settings.set_string("demo.Email", "").await.unwrap();
        let store = CredentialStore::new(settings, "demo");

        let saved = store.load().await.unwrap();
        assert!(saved.is_empty());
    }

    #[tokio::test]
    async fn test_user_without_photo_clears_saved_url() {
        let store = CredentialStore::new(Arc::new(MemorySettings::default()), "demo");

        store
            .save_user(&AuthUser::new("uid-1", "a@x.com").with_photo_url("https://x/p.png"))
            .await
            .unwrap();
        store
            .save_user(&AuthUser::new("uid-2", "b@x.com"))
            .await
            .unwrap();

        let saved = store.load().await.unwrap();
        assert_eq!(saved.user_id.as_deref(), Some("uid-2"));
        assert!(saved.photo_url.is_none());
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let store = CredentialStore::new(Arc::new(MemorySettings::default()), "demo");
        store.save_email_and_password("a@x.com", "pw").await.unwrap();

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_maps_to_auth_error() {
        let store = CredentialStore::new(Arc::new(BrokenSettings), "demo");

        let err = store.save_email_and_password("a@x.com", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::Storage(msg) if msg.contains("disk full")));
        assert!(store.load().await.is_err());
    }
}
