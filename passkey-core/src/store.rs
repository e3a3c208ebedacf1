//! User and credential persistence.
//!
//! Verification itself is stateless; callers persist the registration result
//! and the counter returned by each authentication through a
//! [`CredentialStore`]. [`MemoryCredentialStore`] is a thread-safe in-memory
//! implementation for tests, tooling and single-process deployments.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::base64url;
use crate::ceremony::RegistrationVerificationResult;
use crate::challenge::normalize_transports;
use crate::cose::JsonWebKey;

/// Display name used when a user does not provide one.
pub const DEFAULT_DISPLAY_NAME: &str = "Player";

/// Store errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Stale signature counter: expected {expected}, found {actual}")]
    Stale { expected: u32, actual: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    /// Trimmed, lowercased email.
    pub email: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Normalized base64url credential ID.
    pub credential_id: String,
    pub public_key_jwk: JsonWebKey,
    pub sign_count: u32,
    pub transports: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Lookup and update operations the ceremonies need.
///
/// Credential IDs are compared in normalized base64url form.
pub trait CredentialStore: Send + Sync {
    fn find_user_by_id(&self, user_id: Uuid) -> Option<UserRecord>;

    fn find_user_by_email(&self, email: &str) -> Option<UserRecord>;

    /// Create a user. Fails with [`StoreError::Conflict`] if the email is taken.
    fn create_user(&self, email: &str, display_name: Option<&str>)
        -> Result<UserRecord, StoreError>;

    fn update_display_name(&self, user_id: Uuid, display_name: &str)
        -> Result<UserRecord, StoreError>;

    /// Remove a user and every credential registered to them.
    fn delete_user(&self, user_id: Uuid) -> Result<(), StoreError>;

    fn list_credentials(&self, user_id: Uuid) -> Vec<CredentialRecord>;

    fn find_credential(&self, user_id: Uuid, credential_id: &str) -> Option<CredentialRecord>;

    /// Persist a verified registration.
    fn create_credential(
        &self,
        user_id: Uuid,
        registration: &RegistrationVerificationResult,
        transports: &[String],
    ) -> Result<CredentialRecord, StoreError>;

    /// Compare-and-set the signature counter after an authentication.
    ///
    /// Fails with [`StoreError::Stale`] if the stored counter is no longer
    /// `expected_previous`, so two racing ceremonies cannot both persist.
    fn update_sign_count(
        &self,
        credential_id: &str,
        expected_previous: u32,
        new_count: u32,
    ) -> Result<CredentialRecord, StoreError>;
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn display_name_or_default(display_name: Option<&str>) -> String {
    display_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_DISPLAY_NAME)
        .to_string()
}

/// In-memory [`CredentialStore`]
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: DashMap<Uuid, UserRecord>,
    /// Normalized email -> user ID
    emails: DashMap<String, Uuid>,
    /// Normalized credential ID -> record
    credentials: DashMap<String, CredentialRecord>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn credential_count(&self) -> usize {
        self.credentials.len()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn find_user_by_id(&self, user_id: Uuid) -> Option<UserRecord> {
        self.users.get(&user_id).map(|user| user.value().clone())
    }

    fn find_user_by_email(&self, email: &str) -> Option<UserRecord> {
        let user_id = *self.emails.get(&normalize_email(email))?;
        self.find_user_by_id(user_id)
    }

    fn create_user(
        &self,
        email: &str,
        display_name: Option<&str>,
    ) -> Result<UserRecord, StoreError> {
        let email = normalize_email(email);

        match self.emails.entry(email.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(format!("user {email}"))),
            Entry::Vacant(slot) => {
                let user = UserRecord {
                    id: Uuid::new_v4(),
                    email,
                    display_name: display_name_or_default(display_name),
                    created_at: Utc::now(),
                };
                self.users.insert(user.id, user.clone());
                slot.insert(user.id);
                tracing::debug!(user_id = %user.id, "User created");
                Ok(user)
            }
        }
    }

    fn update_display_name(
        &self,
        user_id: Uuid,
        display_name: &str,
    ) -> Result<UserRecord, StoreError> {
        let mut user = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::NotFound(format!("user {user_id}")))?;
        user.display_name = display_name_or_default(Some(display_name));
        Ok(user.value().clone())
    }

    fn delete_user(&self, user_id: Uuid) -> Result<(), StoreError> {
        let (_, user) = self
            .users
            .remove(&user_id)
            .ok_or_else(|| StoreError::NotFound(format!("user {user_id}")))?;
        self.emails.remove(&user.email);
        self.credentials.retain(|_, record| record.user_id != user_id);
        tracing::debug!(user_id = %user_id, "User deleted");
        Ok(())
    }

    fn list_credentials(&self, user_id: Uuid) -> Vec<CredentialRecord> {
        let mut records: Vec<CredentialRecord> = self
            .credentials
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|record| record.created_at);
        records
    }

    fn find_credential(&self, user_id: Uuid, credential_id: &str) -> Option<CredentialRecord> {
        self.credentials
            .get(&base64url::normalize(credential_id))
            .filter(|record| record.user_id == user_id)
            .map(|record| record.value().clone())
    }

    fn create_credential(
        &self,
        user_id: Uuid,
        registration: &RegistrationVerificationResult,
        transports: &[String],
    ) -> Result<CredentialRecord, StoreError> {
        if !self.users.contains_key(&user_id) {
            return Err(StoreError::NotFound(format!("user {user_id}")));
        }

        let credential_id = base64url::normalize(&registration.credential_id);
        match self.credentials.entry(credential_id.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(format!("credential {credential_id}"))),
            Entry::Vacant(slot) => {
                let record = CredentialRecord {
                    id: Uuid::new_v4(),
                    user_id,
                    credential_id,
                    public_key_jwk: registration.public_key_jwk.clone(),
                    sign_count: registration.sign_count,
                    transports: normalize_transports(transports),
                    created_at: Utc::now(),
                    last_used_at: None,
                };
                slot.insert(record.clone());
                tracing::info!(credential_id = %record.credential_id, "Credential stored");
                Ok(record)
            }
        }
    }

    fn update_sign_count(
        &self,
        credential_id: &str,
        expected_previous: u32,
        new_count: u32,
    ) -> Result<CredentialRecord, StoreError> {
        let credential_id = base64url::normalize(credential_id);
        let mut record = self
            .credentials
            .get_mut(&credential_id)
            .ok_or_else(|| StoreError::NotFound(format!("credential {credential_id}")))?;

        if record.sign_count != expected_previous {
            return Err(StoreError::Stale {
                expected: expected_previous,
                actual: record.sign_count,
            });
        }

        record.sign_count = new_count;
        record.last_used_at = Some(Utc::now());
        Ok(record.value().clone())
    }
}

impl std::fmt::Debug for MemoryCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCredentialStore")
            .field("users", &self.users.len())
            .field("credentials", &self.credentials.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn registration(credential_id: &str, sign_count: u32) -> RegistrationVerificationResult {
        RegistrationVerificationResult {
            credential_id: credential_id.into(),
            public_key_jwk: JsonWebKey {
                kty: "EC".into(),
                crv: "P-256".into(),
                x: base64url::encode([1u8; 32]),
                y: base64url::encode([2u8; 32]),
                alg: "ES256".into(),
                ext: Some(true),
            },
            sign_count,
            client_data_hash: [0; 32],
        }
    }

    #[test]
    fn test_create_and_find_user() {
        let store = MemoryCredentialStore::new();
        let user = store.create_user("  Player@Example.COM ", None).unwrap();

        assert_eq!(user.email, "player@example.com");
        assert_eq!(user.display_name, DEFAULT_DISPLAY_NAME);
        assert_eq!(store.find_user_by_id(user.id), Some(user.clone()));
        assert_eq!(store.find_user_by_email("PLAYER@example.com"), Some(user));
        assert!(store.find_user_by_email("other@example.com").is_none());
    }

    #[test]
    fn test_duplicate_email_conflicts() {
        let store = MemoryCredentialStore::new();
        store.create_user("a@example.com", Some("A")).unwrap();
        assert!(matches!(
            store.create_user("A@example.com", Some("B")),
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(store.user_count(), 1);
    }

    #[test]
    fn test_update_display_name() {
        let store = MemoryCredentialStore::new();
        let user = store.create_user("a@example.com", Some("A")).unwrap();

        assert_eq!(
            store.update_display_name(user.id, "Builder").unwrap().display_name,
            "Builder"
        );
        assert_eq!(
            store.update_display_name(user.id, "   ").unwrap().display_name,
            DEFAULT_DISPLAY_NAME
        );
        assert!(matches!(
            store.update_display_name(Uuid::new_v4(), "x"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_credentials_are_scoped_to_user() {
        let store = MemoryCredentialStore::new();
        let alice = store.create_user("alice@example.com", None).unwrap();
        let bob = store.create_user("bob@example.com", None).unwrap();

        let transports = vec![" internal ".to_string(), String::new()];
        let record = store
            .create_credential(alice.id, &registration("AQID", 0), &transports)
            .unwrap();

        assert_eq!(record.transports, vec!["internal"]);
        assert!(record.last_used_at.is_none());
        assert_eq!(store.find_credential(alice.id, "AQID="), Some(record.clone()));
        assert!(store.find_credential(bob.id, "AQID").is_none());
        assert_eq!(store.list_credentials(alice.id), vec![record]);
        assert!(store.list_credentials(bob.id).is_empty());
    }

    #[test]
    fn test_duplicate_credential_conflicts() {
        let store = MemoryCredentialStore::new();
        let user = store.create_user("a@example.com", None).unwrap();
        store
            .create_credential(user.id, &registration("AQID", 0), &[])
            .unwrap();

        assert!(matches!(
            store.create_credential(user.id, &registration("AQID", 0), &[]),
            Err(StoreError::Conflict(_))
        ));
        assert!(matches!(
            store.create_credential(Uuid::new_v4(), &registration("BBBB", 0), &[]),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_sign_count_is_compare_and_set() {
        let store = MemoryCredentialStore::new();
        let user = store.create_user("a@example.com", None).unwrap();
        store
            .create_credential(user.id, &registration("AQID", 5), &[])
            .unwrap();

        let updated = store.update_sign_count("AQID", 5, 6).unwrap();
        assert_eq!(updated.sign_count, 6);
        assert!(updated.last_used_at.is_some());

        assert_eq!(
            store.update_sign_count("AQID", 5, 7),
            Err(StoreError::Stale {
                expected: 5,
                actual: 6
            })
        );
        assert!(matches!(
            store.update_sign_count("nope", 0, 1),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_racing_counter_updates_only_one_wins() {
        let store = Arc::new(MemoryCredentialStore::new());
        let user = store.create_user("a@example.com", None).unwrap();
        store
            .create_credential(user.id, &registration("AQID", 1), &[])
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.update_sign_count("AQID", 1, 2).is_ok())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_delete_user_removes_credentials() {
        let store = MemoryCredentialStore::new();
        let user = store.create_user("a@example.com", None).unwrap();
        store
            .create_credential(user.id, &registration("AQID", 0), &[])
            .unwrap();

        store.delete_user(user.id).unwrap();
        assert_eq!(store.credential_count(), 0);
        assert!(store.find_user_by_email("a@example.com").is_none());
        assert!(store.create_user("a@example.com", None).is_ok());
        assert!(matches!(
            store.delete_user(user.id),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_debug_shows_counts() {
        let store = MemoryCredentialStore::new();
        store.create_user("a@example.com", None).unwrap();
        assert_eq!(
            format!("{store:?}"),
            "MemoryCredentialStore { users: 1, credentials: 0 }"
        );
    }
}
