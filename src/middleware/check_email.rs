use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;

use crate::database::{StoreError, UserStore};
use crate::models::NewUser;
use crate::utils::{store_failure, AppError};

pub const DUPLICATE_EMAIL: &str = "User with such email already exists";

/// Rejects `email` if any stored record already carries it.
///
/// The lookup and the insert that follows are separate store calls, so two
/// concurrent creates with the same email can both pass.
pub async fn check_email(store: &dyn UserStore, email: Option<&str>) -> Result<(), AppError> {
    let Some(email) = email else {
        return Ok(());
    };

    match store.find_by_email(email).await {
        Ok(Some(_)) => Err(AppError::Duplicate(DUPLICATE_EMAIL.to_string())),
        Ok(None) => Ok(()),
        Err(e) => Err(store_failure("Failed to check email")(e)),
    }
}

/// Create-user body that has already passed [`check_email`].
///
/// Extracting it runs the check before the handler body, so a duplicate
/// short-circuits the request with 400 and the handler never runs.
#[derive(Debug)]
pub struct UniqueEmail(pub NewUser);

impl UniqueEmail {
    pub fn into_inner(self) -> NewUser {
        self.0
    }
}

impl FromRequest for UniqueEmail {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let body = web::Json::<NewUser>::from_request(req, payload);
        let store = req.app_data::<web::Data<dyn UserStore>>().cloned();

        Box::pin(async move {
            let new_user = body.await?.into_inner();

            let store = store.ok_or_else(|| {
                AppError::Store(StoreError::Unavailable("record store is not registered".into()))
            })?;

            check_email(store.get_ref(), new_user.email_key().as_deref()).await?;

            Ok(UniqueEmail(new_user))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryStore, UnavailableStore};

    async fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert(NewUser {
                name: Some("Illia".into()),
                surname: Some("Nykonchuk".into()),
                email: Some("a@x.com".into()),
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_existing_email_is_rejected() {
        let store = seeded_store().await;

        let err = check_email(&store, Some("a@x.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Duplicate(_)));
        assert_eq!(err.to_string(), DUPLICATE_EMAIL);
    }

    #[tokio::test]
    async fn test_new_or_missing_email_passes() {
        let store = seeded_store().await;

        assert!(check_email(&store, Some("b@x.com")).await.is_ok());
        assert!(check_email(&store, None).await.is_ok());
    }

    #[tokio::test]
    async fn test_store_failure_is_reported() {
        let store = UnavailableStore::new("offline");

        let err = check_email(&store, Some("a@x.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Store(StoreError::Unavailable(_))));

        // no lookup happens without an email
        assert!(check_email(&store, None).await.is_ok());
    }
}
