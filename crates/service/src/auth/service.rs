use std::sync::{Arc, OnceLock};
use std::time::Duration;

use configs::AuthSettings;
use tracing::{error, info, instrument, warn};

use super::errors::{AuthError, StoreError};
use super::password::{self, PasswordHashing};
use super::repository::CredentialStore;
use super::token;

/// Auth service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub token_ttl: Duration,
    pub hashing: PasswordHashing,
}

impl AuthConfig {
    pub fn from_settings(s: &AuthSettings) -> Self {
        Self { token_ttl: s.token_ttl(), hashing: PasswordHashing::from(&s.hashing) }
    }
}

/// Auth business service independent of web framework.
///
/// Stateless apart from its configuration; share it behind an `Arc` across
/// request handlers.
pub struct AuthService<S: CredentialStore> {
    store: Arc<S>,
    cfg: AuthConfig,
    // Verified against when the email is unknown, so both login failures cost
    // one hash verification.
    decoy_hash: OnceLock<String>,
}

impl<S: CredentialStore> AuthService<S> {
    pub fn new(store: Arc<S>, cfg: AuthConfig) -> Self {
        Self { store, cfg, decoy_hash: OnceLock::new() }
    }

    /// Authenticate a user and issue a token signed for `app_id`.
    ///
    /// Unknown email and wrong password both yield
    /// [`AuthError::InvalidCredentials`].
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthConfig, AuthService, password::PasswordHashing, token};
    /// use service::auth::{domain::App, repository::mock::MockCredentialStore};
    /// use std::{sync::Arc, time::Duration};
    /// let app = App { id: 7, name: "billing".into(), secret: "s3cret".into() };
    /// let store = Arc::new(MockCredentialStore::with_app(app));
    /// let hashing = PasswordHashing { memory_kib: 1024, iterations: 1, parallelism: 1 };
    /// let svc = AuthService::new(store, AuthConfig { token_ttl: Duration::from_secs(60), hashing });
    /// let uid = tokio_test::block_on(svc.register_new_user("a@x.com", "pw1")).unwrap();
    /// let jwt = tokio_test::block_on(svc.login("a@x.com", "pw1", 7)).unwrap();
    /// assert_eq!(token::verify(&jwt, "s3cret").unwrap().uid, uid);
    /// ```
    #[instrument(skip_all, fields(email = %email, app_id = app_id))]
    pub async fn login(&self, email: &str, password: &str, app_id: i32) -> Result<String, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidInput("email and password are required"));
        }
        if app_id == 0 {
            return Err(AuthError::InvalidInput("app_id is required"));
        }

        let user = self.store.find_user_by_email(email).await.map_err(|e| store_failure(e, "failed to get user"))?;
        let Some(user) = user else {
            if let Ok(decoy) = self.decoy_hash() {
                let _ = password::verify(password, decoy);
            }
            warn!("user not found");
            return Err(AuthError::InvalidCredentials);
        };

        if !password::verify(password, &user.password_hash).map_err(|e| {
            error!(user_id = user.id, error = %e, "stored password hash is unusable");
            e
        })? {
            warn!(user_id = user.id, "invalid credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let app = self
            .store
            .find_app(app_id)
            .await
            .map_err(|e| store_failure(e, "failed to get app"))?
            .ok_or_else(|| {
                error!("app not found");
                AuthError::AppNotFound
            })?;

        let token = token::issue(&user, &app, self.cfg.token_ttl).map_err(|e| {
            error!(user_id = user.id, error = %e, "failed to sign token");
            e
        })?;
        info!(user_id = user.id, "user logged in");
        Ok(token)
    }

    /// Register a new user with a salted, hashed password and return its id.
    #[instrument(skip_all, fields(email = %email))]
    pub async fn register_new_user(&self, email: &str, password: &str) -> Result<i64, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidInput("email and password are required"));
        }

        let hash = self.cfg.hashing.hash(password).map_err(|e| {
            error!(error = %e, "failed to hash password");
            e
        })?;

        match self.store.create_user(email, &hash).await {
            Ok(user_id) => {
                info!(user_id, "user registered");
                Ok(user_id)
            }
            Err(StoreError::Conflict) => {
                warn!("user already exists");
                Err(AuthError::UserAlreadyExists)
            }
            Err(e) => Err(store_failure(e, "failed to save user")),
        }
    }

    /// Whether `user_id` holds admin privileges; read fresh from the store.
    #[instrument(skip_all, fields(user_id = user_id))]
    pub async fn is_admin(&self, user_id: i64) -> Result<bool, AuthError> {
        if user_id == 0 {
            return Err(AuthError::InvalidInput("user_id is required"));
        }
        match self.store.is_admin(user_id).await.map_err(|e| store_failure(e, "failed to check admin status"))? {
            Some(is_admin) => {
                info!(is_admin, "checked if user is admin");
                Ok(is_admin)
            }
            None => {
                warn!("user not found");
                Err(AuthError::UserNotFound)
            }
        }
    }

    fn decoy_hash(&self) -> Result<&str, AuthError> {
        if let Some(hash) = self.decoy_hash.get() {
            return Ok(hash.as_str());
        }
        let hash = self.cfg.hashing.hash("decoy-password")?;
        Ok(self.decoy_hash.get_or_init(|| hash).as_str())
    }
}

fn store_failure(e: StoreError, what: &'static str) -> AuthError {
    error!(error = %e, "{what}");
    AuthError::from(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::domain::App;
    use crate::auth::repository::mock::MockCredentialStore;

    const SECRET: &str = "app-7-secret";

    fn cfg() -> AuthConfig {
        AuthConfig {
            token_ttl: Duration::from_secs(3600),
            hashing: PasswordHashing { memory_kib: 1024, iterations: 1, parallelism: 1 },
        }
    }

    fn setup() -> (Arc<MockCredentialStore>, AuthService<MockCredentialStore>) {
        let store = Arc::new(MockCredentialStore::with_app(App { id: 7, name: "app-7".into(), secret: SECRET.into() }));
        let svc = AuthService::new(store.clone(), cfg());
        (store, svc)
    }

    #[tokio::test]
    async fn register_login_and_admin_scenario() {
        let (_store, svc) = setup();

        assert_eq!(svc.register_new_user("a@x.com", "pw1").await, Ok(1));
        assert_eq!(svc.register_new_user("a@x.com", "pw2").await, Err(AuthError::UserAlreadyExists));

        let issued_at = chrono::Utc::now().timestamp();
        let jwt = svc.login("a@x.com", "pw1", 7).await.unwrap();
        let claims = token::verify(&jwt, SECRET).unwrap();
        assert_eq!(claims.uid, 1);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.app_id, 7);
        assert!((claims.exp - (issued_at + 3600)).abs() <= 2);

        assert_eq!(svc.login("a@x.com", "wrong", 7).await, Err(AuthError::InvalidCredentials));
        assert_eq!(svc.is_admin(1).await, Ok(false));
    }

    #[tokio::test]
    async fn unknown_email_is_indistinguishable_from_wrong_password() {
        let (_store, svc) = setup();
        svc.register_new_user("a@x.com", "pw1").await.unwrap();

        let wrong_password = svc.login("a@x.com", "nope", 7).await.unwrap_err();
        let unknown_email = svc.login("ghost@x.com", "pw1", 7).await.unwrap_err();
        assert_eq!(wrong_password, unknown_email);
        assert_eq!(unknown_email, AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn missing_app_is_internal_and_checked_after_credentials() {
        let (_store, svc) = setup();
        svc.register_new_user("a@x.com", "pw1").await.unwrap();

        assert_eq!(svc.login("a@x.com", "pw1", 99).await, Err(AuthError::AppNotFound));
        // bad credentials win over a bad app id
        assert_eq!(svc.login("a@x.com", "bad", 99).await, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn stored_hashes_are_salted_per_registration() {
        let (store, svc) = setup();
        svc.register_new_user("a@x.com", "same").await.unwrap();
        svc.register_new_user("b@x.com", "same").await.unwrap();

        let a = store.password_hash("a@x.com").unwrap();
        let b = store.password_hash("b@x.com").unwrap();
        assert_ne!(a, b);
        assert!(!a.contains("same"));
    }

    #[tokio::test]
    async fn admin_flag_is_read_fresh() {
        let (store, svc) = setup();
        let uid = svc.register_new_user("root@x.com", "pw").await.unwrap();

        assert_eq!(svc.is_admin(uid).await, Ok(false));
        assert!(store.set_admin(uid, true));
        assert_eq!(svc.is_admin(uid).await, Ok(true));
        assert_eq!(svc.is_admin(uid + 1).await, Err(AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn store_outage_surfaces_as_store_unavailable() {
        let (store, svc) = setup();
        svc.register_new_user("a@x.com", "pw1").await.unwrap();
        store.set_unavailable(true);

        assert!(matches!(svc.login("a@x.com", "pw1", 7).await, Err(AuthError::StoreUnavailable(_))));
        assert!(matches!(svc.register_new_user("b@x.com", "pw").await, Err(AuthError::StoreUnavailable(_))));
        assert!(matches!(svc.is_admin(1).await, Err(AuthError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn defensive_checks_reject_empty_arguments() {
        let (_store, svc) = setup();
        assert!(matches!(svc.login("", "pw", 7).await, Err(AuthError::InvalidInput(_))));
        assert!(matches!(svc.login("a@x.com", "pw", 0).await, Err(AuthError::InvalidInput(_))));
        assert!(matches!(svc.register_new_user("a@x.com", "").await, Err(AuthError::InvalidInput(_))));
        assert!(matches!(svc.is_admin(0).await, Err(AuthError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn ttl_comes_from_configuration() {
        let store = Arc::new(MockCredentialStore::with_app(App { id: 7, name: "app-7".into(), secret: SECRET.into() }));
        let svc = AuthService::new(store, AuthConfig { token_ttl: Duration::from_secs(90), ..cfg() });
        svc.register_new_user("a@x.com", "pw").await.unwrap();

        let now = chrono::Utc::now().timestamp();
        let claims = token::verify(&svc.login("a@x.com", "pw", 7).await.unwrap(), SECRET).unwrap();
        assert!((claims.exp - (now + 90)).abs() <= 2);
    }
}
