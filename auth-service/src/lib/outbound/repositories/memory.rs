use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::Permission;
use crate::domain::identity::models::Role;
use crate::domain::identity::ports::IdentityStore;
use crate::identity::errors::AuthError;

/// Identity store held in process memory.
///
/// Used when no database is configured and by the HTTP integration tests.
/// Contents are lost on restart.
pub struct InMemoryIdentityStore {
    identities: RwLock<HashMap<String, Identity>>,
    roles: RwLock<HashMap<String, Role>>,
}

impl InMemoryIdentityStore {
    /// Empty store with no roles seeded.
    pub fn new() -> Self {
        Self {
            identities: RwLock::new(HashMap::new()),
            roles: RwLock::new(HashMap::new()),
        }
    }

    /// Store seeded with the `USER` and `ADMIN` roles.
    pub fn with_default_roles() -> Self {
        let roles = [
            Role::new("USER", vec![Permission::new("profile:read")]),
            Role::new(
                "ADMIN",
                vec![
                    Permission::new("profile:read"),
                    Permission::new("users:manage"),
                ],
            ),
        ];

        Self {
            identities: RwLock::new(HashMap::new()),
            roles: RwLock::new(
                roles
                    .into_iter()
                    .map(|role| (role.name.clone(), role))
                    .collect(),
            ),
        }
    }

    /// Add or replace a role definition.
    pub async fn insert_role(&self, role: Role) {
        self.roles.write().await.insert(role.name.clone(), role);
    }

    /// Replace the roles granted to an existing identity.
    ///
    /// # Errors
    /// * `Unknown` - No identity is stored for `email`
    pub async fn grant_roles(&self, email: &str, roles: Vec<Role>) -> Result<(), AuthError> {
        let mut identities = self.identities.write().await;
        let identity = identities
            .get_mut(email)
            .ok_or_else(|| AuthError::Unknown(format!("No identity for {}", email)))?;
        identity.roles = roles;
        Ok(())
    }

    /// Remove an identity, as an administrator deleting the account would.
    pub async fn remove(&self, email: &str) -> Option<Identity> {
        self.identities.write().await.remove(email)
    }
}

impl Default for InMemoryIdentityStore {
    fn default() -> Self {
        Self::with_default_roles()
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, AuthError> {
        Ok(self.identities.read().await.contains_key(email.as_str()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AuthError> {
        Ok(self.identities.read().await.get(email).cloned())
    }

    async fn save(&self, identity: Identity) -> Result<Identity, AuthError> {
        let mut identities = self.identities.write().await;

        if identities.contains_key(identity.email.as_str()) {
            return Err(AuthError::DuplicateIdentity(identity.email.to_string()));
        }

        identities.insert(identity.email.as_str().to_string(), identity.clone());
        Ok(identity)
    }

    async fn find_role(&self, name: &str) -> Result<Option<Role>, AuthError> {
        Ok(self.roles.read().await.get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::domain::identity::models::UserId;

    fn identity(email: &str) -> Identity {
        Identity {
            id: UserId::new(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            password_hash: "$argon2id$test_hash".to_string(),
            roles: vec![Role::new("USER", vec![])],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let store = InMemoryIdentityStore::new();
        let email = EmailAddress::new("a@x.com".to_string()).unwrap();

        assert!(!store.exists_by_email(&email).await.unwrap());
        store.save(identity("a@x.com")).await.unwrap();
        assert!(store.exists_by_email(&email).await.unwrap());

        let found = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(found.email, email);
        assert!(store.find_by_email("b@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_rejects_duplicate() {
        let store = InMemoryIdentityStore::new();
        store.save(identity("a@x.com")).await.unwrap();

        let result = store.save(identity("a@x.com")).await;
        assert!(matches!(result.unwrap_err(), AuthError::DuplicateIdentity(_)));
    }

    #[tokio::test]
    async fn test_concurrent_saves_admit_one() {
        let store = Arc::new(InMemoryIdentityStore::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.save(identity("race@x.com")).await })
            })
            .collect();

        let mut saved = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                saved += 1;
            }
        }
        assert_eq!(saved, 1);
    }

    #[tokio::test]
    async fn test_default_roles_seeded() {
        let store = InMemoryIdentityStore::with_default_roles();

        let user = store.find_role("USER").await.unwrap().unwrap();
        assert_eq!(user.permissions, vec![Permission::new("profile:read")]);

        let admin = store.find_role("ADMIN").await.unwrap().unwrap();
        assert_eq!(admin.permissions.len(), 2);

        assert!(store.find_role("MISSING").await.unwrap().is_none());
        assert!(InMemoryIdentityStore::new()
            .find_role("USER")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_grant_roles_and_remove() {
        let store = InMemoryIdentityStore::with_default_roles();
        store.save(identity("a@x.com")).await.unwrap();

        let admin = store.find_role("ADMIN").await.unwrap().unwrap();
        store.grant_roles("a@x.com", vec![admin]).await.unwrap();

        let found = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(found.roles[0].name, "ADMIN");

        assert!(store.grant_roles("b@x.com", vec![]).await.is_err());
        assert!(store.remove("a@x.com").await.is_some());
        assert!(store.find_by_email("a@x.com").await.unwrap().is_none());
    }
}
