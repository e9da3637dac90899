use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StorageError;
use crate::storage::{KeyValueStorage, MemoryStorage};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Holds the access/refresh token pair on top of an injected storage.
///
/// Holding an access token is the only local notion of being signed in;
/// whether it is still valid is up to the server.
pub struct Session {
    storage: Arc<dyn KeyValueStorage>,
    refresh_gate: Mutex<()>,
}

impl Session {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            refresh_gate: Mutex::new(()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Stores a new access token. Without a refresh token the stored one is kept.
    pub fn set_tokens(&self, access: &str, refresh: Option<&str>) -> Result<(), StorageError> {
        self.storage.set(ACCESS_TOKEN_KEY, access)?;
        if let Some(refresh) = refresh.filter(|r| !r.is_empty()) {
            self.storage.set(REFRESH_TOKEN_KEY, refresh)?;
        }
        debug!("session tokens updated");
        Ok(())
    }

    pub fn access_token(&self) -> Option<String> {
        self.storage.get(ACCESS_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.storage.get(REFRESH_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(ACCESS_TOKEN_KEY)?;
        self.storage.remove(REFRESH_TOKEN_KEY)?;
        debug!("session tokens cleared");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// Serializes token refreshes across every request sharing this session.
    pub(crate) fn refresh_gate(&self) -> &Mutex<()> {
        &self.refresh_gate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence_of_access_token_means_authenticated() {
        let session = Session::in_memory();
        assert!(!session.is_authenticated());

        session.set_tokens("not-even-a-jwt", None).unwrap();
        assert!(session.is_authenticated());

        session.clear().unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(session.refresh_token(), None);
    }

    #[test]
    fn setting_access_only_keeps_refresh_token() {
        let session = Session::in_memory();
        session.set_tokens("a1", Some("r1")).unwrap();
        session.set_tokens("a2", None).unwrap();

        assert_eq!(session.access_token().as_deref(), Some("a2"));
        assert_eq!(session.refresh_token().as_deref(), Some("r1"));
    }

    #[test]
    fn tokens_live_under_fixed_keys() {
        let storage = Arc::new(MemoryStorage::new());
        let session = Session::new(storage.clone());
        session.set_tokens("a1", Some("r1")).unwrap();

        assert_eq!(storage.get("access_token").as_deref(), Some("a1"));
        assert_eq!(storage.get("refresh_token").as_deref(), Some("r1"));
    }
}
