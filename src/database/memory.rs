use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{StoreError, UserStore};
use crate::models::{parse_user_id, NewUser, User, UserChanges};

/// Process-local record store with the same contract as [`super::MongoDB`].
///
/// Records are kept in insertion order, which is what a full collection scan
/// returns from MongoDB as well.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn connect(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.read().await.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let object_id = parse_user_id(id)?;
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == object_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
        let user = User::create(new_user)?;
        self.users.write().await.push(user.clone());
        Ok(user)
    }

    async fn update_by_id(
        &self,
        id: &str,
        changes: UserChanges,
    ) -> Result<Option<User>, StoreError> {
        let object_id = parse_user_id(id)?;
        let mut users = self.users.write().await;

        Ok(users.iter_mut().find(|u| u.id == object_id).map(|user| {
            let before = user.clone();
            user.apply(&changes);
            before
        }))
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let object_id = parse_user_id(id)?;
        let mut users = self.users.write().await;

        Ok(users
            .iter()
            .position(|u| u.id == object_id)
            .map(|index| users.remove(index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn john(email: Option<&str>) -> NewUser {
        NewUser {
            name: Some("John".into()),
            surname: Some("Doe".into()),
            email: email.map(Value::from),
        }
    }

    #[tokio::test]
    async fn test_insert_then_find() {
        let store = MemoryStore::new();
        let created = store.insert(john(Some("john@example.com"))).await.unwrap();

        let by_id = store.find_by_id(&created.id.to_hex()).await.unwrap();
        assert_eq!(by_id, Some(created.clone()));

        let by_email = store.find_by_email("john@example.com").await.unwrap();
        assert_eq!(by_email, Some(created));

        assert!(store.find_by_email("other@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_enforces_schema() {
        let store = MemoryStore::new();
        let err = store
            .insert(NewUser {
                name: Some("John".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_does_not_enforce_unique_email() {
        let store = MemoryStore::new();
        store.insert(john(Some("dup@example.com"))).await.unwrap();
        store.insert(john(Some("dup@example.com"))).await.unwrap();

        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_returns_previous_record() {
        let store = MemoryStore::new();
        let created = store.insert(john(None)).await.unwrap();
        let id = created.id.to_hex();

        let before = store
            .update_by_id(
                &id,
                UserChanges {
                    name: Some("Jane".into()),
                    email: Some(Some("jane@example.com".into())),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(before.name, "John");

        let after = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(after.name, "Jane");
        assert_eq!(after.surname, "Doe");
        assert_eq!(after.email.as_deref(), Some("jane@example.com"));
        assert_eq!(after.id, created.id);
        assert_eq!(after.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id() {
        let store = MemoryStore::new();
        let missing = mongodb::bson::oid::ObjectId::new().to_hex();

        assert!(store
            .update_by_id(&missing, UserChanges::default())
            .await
            .unwrap()
            .is_none());
        assert!(store.delete_by_id(&missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_is_permanent() {
        let store = MemoryStore::new();
        let created = store.insert(john(None)).await.unwrap();
        let id = created.id.to_hex();

        assert_eq!(store.delete_by_id(&id).await.unwrap(), Some(created));
        assert!(store.find_by_id(&id).await.unwrap().is_none());
        assert!(store.delete_by_id(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_ids_are_cast_errors() {
        let store = MemoryStore::new();

        assert!(matches!(
            store.find_by_id("123").await,
            Err(StoreError::Cast(_))
        ));
        assert!(matches!(
            store.delete_by_id("123").await,
            Err(StoreError::Cast(_))
        ));
    }
}
