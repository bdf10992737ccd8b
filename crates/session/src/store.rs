//! In-process owner of the current session token.

use portal_auth::SessionToken;
use tracing::{debug, warn};

use crate::storage::CredentialStorage;

/// Holds at most one [`SessionToken`], optionally mirrored to durable
/// storage.
///
/// The in-memory value is authoritative for the process lifetime: durable
/// storage is read exactly once, at construction. `set`/`clear` are
/// synchronous and immediately visible to subsequent `get` calls.
pub struct TokenStore {
    current: Option<SessionToken>,
    storage: Option<Box<dyn CredentialStorage>>,
}

impl TokenStore {
    /// Store without persistence; state lives only for the process lifetime.
    pub fn in_memory() -> Self {
        Self {
            current: None,
            storage: None,
        }
    }

    /// Store backed by durable storage, hydrated once at construction.
    ///
    /// A persisted credential that fails to decode is purged rather than
    /// crashing: corrupt storage is equivalent to "no session".
    pub fn with_storage(storage: Box<dyn CredentialStorage>) -> Self {
        let current = match storage.load() {
            None => None,
            Some(raw) => match SessionToken::from_raw(raw) {
                Ok(token) => Some(token),
                Err(err) => {
                    warn!(%err, "purging undecodable persisted credential");
                    storage.remove();
                    None
                }
            },
        };

        Self {
            current,
            storage: Some(storage),
        }
    }

    pub fn get(&self) -> Option<&SessionToken> {
        self.current.as_ref()
    }

    pub fn set(&mut self, token: SessionToken) {
        if let Some(storage) = &self.storage {
            storage.store(token.raw());
        }
        self.current = Some(token);
    }

    pub fn clear(&mut self) {
        if self.current.take().is_some() {
            debug!("session token cleared");
        }
        if let Some(storage) = &self.storage {
            storage.remove();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryCredentialStorage;
    use base64ct::{Base64UrlUnpadded, Encoding};
    use std::rc::Rc;

    fn mint(username: &str, exp: i64) -> String {
        let payload = Base64UrlUnpadded::encode_string(
            format!(
                r#"{{"username":"{username}","email":"{username}@example.com","exp":{exp},"iat":1}}"#
            )
            .as_bytes(),
        );
        format!("h.{payload}.s")
    }

    /// Shared handle so tests can observe what the store persisted.
    struct SharedStorage(Rc<MemoryCredentialStorage>);

    impl CredentialStorage for SharedStorage {
        fn load(&self) -> Option<String> {
            self.0.load()
        }
        fn store(&self, raw: &str) {
            self.0.store(raw);
        }
        fn remove(&self) {
            self.0.remove();
        }
    }

    #[test]
    fn write_then_read_consistency() {
        let mut store = TokenStore::in_memory();
        assert!(store.get().is_none());

        let token = SessionToken::from_raw(mint("alice", 99)).unwrap();
        store.set(token.clone());
        assert_eq!(store.get(), Some(&token));

        store.clear();
        assert!(store.get().is_none());
    }

    #[test]
    fn hydrates_persisted_credential() {
        let raw = mint("alice", 99);
        let store = TokenStore::with_storage(Box::new(MemoryCredentialStorage::seeded(&raw)));
        assert_eq!(store.get().map(|t| t.raw()), Some(raw.as_str()));
    }

    #[test]
    fn purges_corrupt_persisted_credential() {
        let backing = Rc::new(MemoryCredentialStorage::seeded("not-a-credential"));
        let store = TokenStore::with_storage(Box::new(SharedStorage(Rc::clone(&backing))));

        assert!(store.get().is_none());
        assert_eq!(backing.load(), None);
    }

    #[test]
    fn set_and_clear_mirror_to_storage() {
        let backing = Rc::new(MemoryCredentialStorage::new());
        let mut store = TokenStore::with_storage(Box::new(SharedStorage(Rc::clone(&backing))));

        let raw = mint("bob", 50);
        store.set(SessionToken::from_raw(raw.clone()).unwrap());
        assert_eq!(backing.load(), Some(raw));

        store.clear();
        assert_eq!(backing.load(), None);
    }

    #[test]
    fn get_does_not_reread_storage_after_construction() {
        let backing = Rc::new(MemoryCredentialStorage::new());
        let store = TokenStore::with_storage(Box::new(SharedStorage(Rc::clone(&backing))));

        // A credential appearing behind the store's back stays invisible.
        backing.store(&mint("eve", 99));
        assert!(store.get().is_none());
    }
}
