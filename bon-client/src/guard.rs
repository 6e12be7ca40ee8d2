//! Staff access guard
//!
//! Admin and owner screens are gated by a password checked by the backend.
//! A successful check leaves a flag in the local store so the prompt is not
//! shown again on this device until [`AccessGuard::lock`].

use std::sync::Arc;

use shared::models::AccessLevel;
use shared::validation::{MAX_PASSWORD_LEN, validate_required_text};

use crate::api::SettingsApi;
use crate::storage::{SharedStore, keys};
use crate::{ClientError, ClientResult};

const UNLOCKED: &str = "true";

fn flag_key(level: AccessLevel) -> &'static str {
    match level {
        AccessLevel::Admin => keys::ADMIN_AUTH,
        AccessLevel::Owner => keys::OWNER_AUTH,
    }
}

pub struct AccessGuard {
    api: Arc<dyn SettingsApi>,
    store: SharedStore,
}

impl AccessGuard {
    pub fn new(api: Arc<dyn SettingsApi>, store: SharedStore) -> Self {
        Self { api, store }
    }

    pub fn is_unlocked(&self, level: AccessLevel) -> bool {
        matches!(self.store.get(flag_key(level)), Ok(Some(v)) if v == UNLOCKED)
    }

    /// Check a password and remember the unlock on success.
    ///
    /// A rejected password yields [`ClientError::Unauthorized`]; network
    /// failures are returned as-is.
    pub async fn unlock(&self, level: AccessLevel, password: &str) -> ClientResult<()> {
        validate_required_text(password, "password", MAX_PASSWORD_LEN)?;

        let response = match self.api.verify_password(level, password).await {
            Ok(response) => response,
            Err(
                ClientError::Unauthorized(_)
                | ClientError::Forbidden(_)
                | ClientError::Validation(_)
                | ClientError::NotFound(_),
            ) => {
                tracing::warn!(target: "security", level = %level, "Access password rejected");
                return Err(ClientError::Unauthorized("Invalid Password".into()));
            }
            Err(e) => return Err(e),
        };

        if !response.success {
            tracing::warn!(target: "security", level = %level, "Access password rejected");
            return Err(ClientError::Unauthorized("Invalid Password".into()));
        }

        self.store.set(flag_key(level), UNLOCKED)?;
        tracing::info!(target: "security", level = %level, "Access unlocked");
        Ok(())
    }

    pub fn lock(&self, level: AccessLevel) -> ClientResult<()> {
        self.store.remove(flag_key(level))?;
        tracing::info!(target: "security", level = %level, "Access locked");
        Ok(())
    }
}

impl std::fmt::Debug for AccessGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGuard").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use shared::models::VerifyResponse;

    struct FixedPassword(&'static str);

    #[async_trait]
    impl SettingsApi for FixedPassword {
        async fn verify_password(
            &self,
            _level: AccessLevel,
            password: &str,
        ) -> ClientResult<VerifyResponse> {
            if password == self.0 {
                Ok(VerifyResponse {
                    success: true,
                    message: None,
                })
            } else {
                Err(ClientError::Unauthorized("Invalid password".into()))
            }
        }
    }

    #[tokio::test]
    async fn test_unlock_and_lock() {
        let store = MemoryStore::shared();
        let guard = AccessGuard::new(Arc::new(FixedPassword("1234")), store.clone());

        assert!(!guard.is_unlocked(AccessLevel::Admin));
        guard.unlock(AccessLevel::Admin, "1234").await.unwrap();
        assert!(guard.is_unlocked(AccessLevel::Admin));
        assert!(!guard.is_unlocked(AccessLevel::Owner));
        assert_eq!(store.get(keys::ADMIN_AUTH).unwrap().as_deref(), Some("true"));

        guard.lock(AccessLevel::Admin).unwrap();
        assert!(!guard.is_unlocked(AccessLevel::Admin));
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let guard = AccessGuard::new(Arc::new(FixedPassword("1234")), MemoryStore::shared());
        let err = guard.unlock(AccessLevel::Owner, "nope").await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized(ref m) if m == "Invalid Password"));
        assert!(!guard.is_unlocked(AccessLevel::Owner));
    }

    #[tokio::test]
    async fn test_empty_password_is_rejected_locally() {
        let guard = AccessGuard::new(Arc::new(FixedPassword("")), MemoryStore::shared());
        let err = guard.unlock(AccessLevel::Admin, "  ").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }
}
