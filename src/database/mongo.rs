use std::time::Duration;

use async_trait::async_trait;
use futures::stream::StreamExt;
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use tokio::sync::OnceCell;

use super::{StoreError, UserStore};
use crate::models::{parse_user_id, NewUser, User, UserChanges, USERS_COLLECTION};

/// Database used when neither `DB_NAME` nor the URI path names one.
const DEFAULT_DATABASE: &str = "test";

/// MongoDB-backed record store.
///
/// Holds only the URI until [`UserStore::connect`] succeeds. Parsing an
/// `mongodb+srv://` URI resolves DNS records, so it belongs to the
/// background connect and never delays the listener.
pub struct MongoDB {
    uri: String,
    db_name: Option<String>,
    handle: OnceCell<(Client, Database)>,
}

/// Explicit name first, then the database in the URI path.
fn resolve_db_name(explicit: Option<&str>, from_uri: Option<&str>) -> String {
    explicit
        .or(from_uri)
        .unwrap_or(DEFAULT_DATABASE)
        .to_string()
}

impl MongoDB {
    pub fn new(uri: &str, db_name: Option<&str>) -> Self {
        Self {
            uri: uri.to_string(),
            db_name: db_name.map(str::to_string),
            handle: OnceCell::new(),
        }
    }

    async fn open(&self) -> Result<(Client, Database), StoreError> {
        let mut client_options = ClientOptions::parse(&self.uri).await?;

        client_options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(Duration::from_secs(300));
        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));

        let db_name = resolve_db_name(
            self.db_name.as_deref(),
            client_options.default_database.as_deref(),
        );

        let client = Client::with_options(client_options)?;
        let db = client.database(&db_name);

        log::info!("📊 Database: {}", db_name);

        db.run_command(doc! { "ping": 1 }).await?;
        Ok((client, db))
    }

    /// Non-unique lookup index backing the duplicate-email check.
    async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let email_index = IndexModel::builder().keys(doc! { "email": 1 }).build();

        match self.users()?.create_index(email_index).await {
            Ok(_) => log::info!("   ✅ Index ready: {}(email)", USERS_COLLECTION),
            Err(e) => log::debug!("   ℹ️  Index not created: {}", e),
        }

        Ok(())
    }

    /// The connected database, once [`UserStore::connect`] has succeeded.
    pub fn database(&self) -> Option<&Database> {
        self.handle.get().map(|(_, db)| db)
    }

    fn users(&self) -> Result<Collection<User>, StoreError> {
        self.database()
            .map(|db| db.collection(USERS_COLLECTION))
            .ok_or_else(|| StoreError::Unavailable("not connected".to_string()))
    }
}

#[async_trait]
impl UserStore for MongoDB {
    async fn connect(&self) -> Result<(), StoreError> {
        let (_, db) = self.handle.get_or_try_init(|| self.open()).await?;
        log::info!("🔗 MongoDB reachable, database: {}", db.name());
        self.ensure_indexes().await
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let mut cursor = self.users()?.find(doc! {}).await?;

        let mut users = Vec::new();
        while let Some(result) = cursor.next().await {
            users.push(result?);
        }

        Ok(users)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let object_id = parse_user_id(id)?;
        Ok(self.users()?.find_one(doc! { "_id": object_id }).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users()?.find_one(doc! { "email": email }).await?)
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
        let user = User::create(new_user)?;
        self.users()?.insert_one(&user).await?;
        Ok(user)
    }

    async fn update_by_id(
        &self,
        id: &str,
        changes: UserChanges,
    ) -> Result<Option<User>, StoreError> {
        let object_id = parse_user_id(id)?;

        Ok(self
            .users()?
            .find_one_and_update(doc! { "_id": object_id }, changes.to_update_document())
            .await?)
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let object_id = parse_user_id(id)?;
        Ok(self
            .users()?
            .find_one_and_delete(doc! { "_id": object_id })
            .await?)
    }

    async fn shutdown(&self) {
        if let Some((client, _)) = self.handle.get() {
            log::info!("🔌 Closing MongoDB connections");
            client.clone().shutdown().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_name_resolution() {
        assert_eq!(resolve_db_name(Some("custom"), Some("records")), "custom");
        assert_eq!(resolve_db_name(None, Some("records")), "records");
        assert_eq!(resolve_db_name(None, None), DEFAULT_DATABASE);
    }

    #[tokio::test]
    async fn test_uri_path_names_the_database() {
        let options = ClientOptions::parse("mongodb://127.0.0.1:1/records")
            .await
            .unwrap();
        assert_eq!(
            resolve_db_name(None, options.default_database.as_deref()),
            "records"
        );
    }

    #[tokio::test]
    async fn test_operations_before_connect_are_unavailable() {
        let db = MongoDB::new("mongodb+srv://cluster.invalid/records", None);
        assert!(db.database().is_none());

        let err = db.list().await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        let err = db.find_by_email("a@x.com").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        // no-op without a client
        db.shutdown().await;
    }

    #[tokio::test]
    async fn test_malformed_id_is_rejected_before_the_query() {
        let db = MongoDB::new("mongodb://127.0.0.1:1", None);

        let err = db.find_by_id("abc").await.unwrap_err();
        assert!(matches!(err, StoreError::Cast(_)));
    }

    #[tokio::test]
    async fn test_connect_with_invalid_uri_fails() {
        let db = MongoDB::new("not a mongo uri", None);

        assert!(matches!(db.connect().await, Err(StoreError::Driver(_))));
        assert!(db.database().is_none());
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_round_trip() {
        dotenv::dotenv().ok();
        let uri = std::env::var("DB_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017/user_service_test".to_string());

        let db = MongoDB::new(&uri, None);
        db.connect().await.unwrap();

        let created = db
            .insert(NewUser {
                name: Some("Illia".into()),
                surname: Some("Nykonchuk".into()),
                email: Some(format!("{}@example.com", mongodb::bson::oid::ObjectId::new()).into()),
            })
            .await
            .unwrap();
        let id = created.id.to_hex();

        let found = db.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(found.name, "Illia");

        let before = db
            .update_by_id(
                &id,
                UserChanges {
                    name: Some("Illia2".into()),
                    email: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(before.name, "Illia");

        let after = db.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(after.name, "Illia2");
        assert_eq!(after.email, None);

        assert!(db.delete_by_id(&id).await.unwrap().is_some());
        assert!(db.find_by_id(&id).await.unwrap().is_none());

        db.shutdown().await;
    }
}
