use sea_orm::DatabaseConnection;

use models::errors::ModelError;

use crate::auth::domain::{App, User};
use crate::auth::errors::StoreError;
use crate::auth::repository::CredentialStore;

/// Credential store backed by the `user` and `app` tables.
pub struct SeaOrmCredentialStore {
    pub db: DatabaseConnection,
}

impl SeaOrmCredentialStore {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn store_err(e: ModelError) -> StoreError {
    match e {
        ModelError::Conflict(_) => StoreError::Conflict,
        other => StoreError::Unavailable(other.to_string()),
    }
}

#[async_trait::async_trait]
impl CredentialStore for SeaOrmCredentialStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let res = models::user::find_by_email(&self.db, email).await.map_err(store_err)?;
        Ok(res.map(|u| User { id: u.id, email: u.email, password_hash: u.password_hash }))
    }

    async fn create_user(&self, email: &str, password_hash: &str) -> Result<i64, StoreError> {
        let created = models::user::create(&self.db, email, password_hash).await.map_err(store_err)?;
        Ok(created.id)
    }

    async fn find_app(&self, app_id: i32) -> Result<Option<App>, StoreError> {
        let res = models::app::find(&self.db, app_id).await.map_err(store_err)?;
        Ok(res.map(|a| App { id: a.id, name: a.name, secret: a.secret }))
    }

    async fn is_admin(&self, user_id: i64) -> Result<Option<bool>, StoreError> {
        let res = models::user::find(&self.db, user_id).await.map_err(store_err)?;
        Ok(res.map(|u| u.is_admin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn store_contract_on_sqlite() -> anyhow::Result<()> {
        let store = SeaOrmCredentialStore::new(get_db().await?);

        assert_eq!(store.find_user_by_email("a@x.com").await?, None);
        let id = store.create_user("a@x.com", "$argon2id$fake").await?;
        assert_eq!(id, 1);
        assert_eq!(store.create_user("a@x.com", "$argon2id$other").await, Err(StoreError::Conflict));

        let user = store.find_user_by_email("a@x.com").await?.expect("user stored");
        assert_eq!(user.id, id);
        assert_eq!(user.password_hash, "$argon2id$fake");

        assert_eq!(store.is_admin(id).await?, Some(false));
        models::user::set_admin(&store.db, id, true).await?;
        assert_eq!(store.is_admin(id).await?, Some(true));
        assert_eq!(store.is_admin(42).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn apps_are_read_from_the_app_table() -> anyhow::Result<()> {
        let store = SeaOrmCredentialStore::new(get_db().await?);
        models::app::upsert(&store.db, 7, "billing", "s3cret").await?;

        let app = store.find_app(7).await?.expect("app 7");
        assert_eq!(app.name, "billing");
        assert_eq!(app.secret, "s3cret");
        assert!(store.find_app(8).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn closed_connection_reports_unavailable() -> anyhow::Result<()> {
        let db = get_db().await?;
        let store = SeaOrmCredentialStore::new(db.clone());
        db.close().await?;
        assert!(matches!(store.find_user_by_email("a@x.com").await, Err(StoreError::Unavailable(_))));
        Ok(())
    }
}
