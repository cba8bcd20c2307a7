pub mod memory;
pub mod mongo;
pub mod status;
pub mod unavailable;

pub use memory::MemoryStore;
pub use mongo::MongoDB;
pub use status::{StoreState, StoreStatus};
pub use unavailable::UnavailableStore;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Config, StoreBackend};
use crate::models::{NewUser, User, UserChanges};

/// Failure raised by the record store.
#[derive(Debug)]
pub enum StoreError {
    /// Identifier is not a valid ObjectId.
    Cast(String),
    /// Required-field check failed on insert.
    Validation(String),
    /// Error reported by the database driver.
    Driver(String),
    /// The store is not configured or not connected.
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Cast(msg) => write!(f, "{}", msg),
            StoreError::Validation(msg) => write!(f, "{}", msg),
            StoreError::Driver(msg) => write!(f, "{}", msg),
            StoreError::Unavailable(msg) => write!(f, "Store unavailable: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        StoreError::Driver(e.to_string())
    }
}

/// Persistence operations behind the `/user` routes.
///
/// Every call is an independent unit of work: there is no transaction
/// spanning two calls, so a lookup followed by a write may interleave with
/// other requests.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Establishes (or verifies) the connection. Called once after the
    /// listener is bound.
    async fn connect(&self) -> Result<(), StoreError>;

    async fn list(&self) -> Result<Vec<User>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Validates `new_user` against the schema and persists it.
    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Applies `changes` to the record with `id`.
    /// Returns the record as it was before the update, `None` if absent.
    async fn update_by_id(
        &self,
        id: &str,
        changes: UserChanges,
    ) -> Result<Option<User>, StoreError>;

    /// Removes the record with `id`, returning it if it existed.
    async fn delete_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    async fn shutdown(&self) {}
}

/// Builds the store selected by `config` without any I/O.
///
/// Never fails: a missing `DB_URL` yields an [`UnavailableStore`] so the
/// server still comes up and reports the failure.
pub fn open_store(config: &Config) -> Arc<dyn UserStore> {
    match config.store_backend {
        StoreBackend::Memory => {
            log::warn!("⚠️  Using in-memory store, records are lost on restart");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Mongo => match config.db_url.as_deref() {
            None => {
                log::error!("❌ DB_URL is not set");
                Arc::new(UnavailableStore::new("DB_URL is not set"))
            }
            Some(uri) => Arc::new(MongoDB::new(uri, config.db_name.as_deref())),
        },
    }
}

/// Connects `store` in the background and records the outcome in `status`.
/// There is no retry: a failed connection stays failed until restart.
pub fn spawn_connect(
    store: Arc<dyn UserStore>,
    status: StoreStatus,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match store.connect().await {
            Ok(()) => {
                status.set(StoreState::Connected);
                log::info!("✅ Connected to DB");
            }
            Err(e) => {
                status.set(StoreState::Failed);
                log::error!("❌ DB connection failed: {}", e);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_connect_marks_store_connected() {
        let status = StoreStatus::default();
        assert_eq!(status.get(), StoreState::Connecting);

        spawn_connect(Arc::new(MemoryStore::new()), status.clone())
            .await
            .unwrap();

        assert_eq!(status.get(), StoreState::Connected);
    }

    #[tokio::test]
    async fn test_spawn_connect_marks_store_failed() {
        let status = StoreStatus::default();

        spawn_connect(Arc::new(UnavailableStore::new("boom")), status.clone())
            .await
            .unwrap();

        assert_eq!(status.get(), StoreState::Failed);
    }

    #[tokio::test]
    async fn test_open_store_without_url_is_unavailable() {
        let config = Config {
            store_backend: StoreBackend::Mongo,
            db_url: None,
            ..Config::default()
        };

        let store = open_store(&config);
        let err = store.list().await.unwrap_err();

        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_open_store_with_invalid_url_fails_to_connect() {
        let config = Config {
            store_backend: StoreBackend::Mongo,
            db_url: Some("not a mongo uri".to_string()),
            ..Config::default()
        };

        let store = open_store(&config);
        let status = StoreStatus::default();

        spawn_connect(store.clone(), status.clone()).await.unwrap();

        assert_eq!(status.get(), StoreState::Failed);
        assert!(matches!(
            store.list().await.unwrap_err(),
            StoreError::Unavailable(_)
        ));
    }
}
