use async_trait::async_trait;

use super::{StoreError, UserStore};
use crate::models::{NewUser, User, UserChanges};

/// Stand-in for a store that is not configured (no `DB_URL`).
/// Every operation fails with the given reason.
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> StoreError {
        StoreError::Unavailable(self.reason.clone())
    }
}

#[async_trait]
impl UserStore for UnavailableStore {
    async fn connect(&self) -> Result<(), StoreError> {
        Err(self.error())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Err(self.error())
    }

    async fn find_by_id(&self, _id: &str) -> Result<Option<User>, StoreError> {
        Err(self.error())
    }

    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
        Err(self.error())
    }

    async fn insert(&self, _new_user: NewUser) -> Result<User, StoreError> {
        Err(self.error())
    }

    async fn update_by_id(
        &self,
        _id: &str,
        _changes: UserChanges,
    ) -> Result<Option<User>, StoreError> {
        Err(self.error())
    }

    async fn delete_by_id(&self, _id: &str) -> Result<Option<User>, StoreError> {
        Err(self.error())
    }
}
