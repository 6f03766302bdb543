use async_trait::async_trait;

use super::domain::{App, User};
use super::errors::StoreError;

/// Persistence capabilities the auth service depends on.
///
/// Lookups return `Ok(None)` for a missing entity; writes return
/// [`StoreError::Conflict`] on a uniqueness violation. Implementations own
/// their locking and pooling, and must make `create_user` atomic.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    /// Persist a user and return the id assigned by the store.
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<i64, StoreError>;

    async fn find_app(&self, app_id: i32) -> Result<Option<App>, StoreError>;
    /// Admin flag of `user_id`, or `None` when no such user exists.
    async fn is_admin(&self, user_id: i64) -> Result<Option<bool>, StoreError>;
}

/// Simple in-memory store for tests, benches and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Mutex, MutexGuard, PoisonError};

    #[derive(Default)]
    struct State {
        users: HashMap<String, User>, // key: email
        admins: HashMap<i64, bool>,   // key: user_id, one entry per user
        apps: HashMap<i32, App>,
        last_id: i64,
    }

    #[derive(Default)]
    pub struct MockCredentialStore {
        state: Mutex<State>,
        unavailable: AtomicBool,
    }

    impl MockCredentialStore {
        pub fn with_app(app: App) -> Self {
            let store = Self::default();
            store.add_app(app);
            store
        }

        pub fn add_app(&self, app: App) {
            self.lock().apps.insert(app.id, app);
        }

        /// Returns false when the user does not exist.
        pub fn set_admin(&self, user_id: i64, is_admin: bool) -> bool {
            match self.lock().admins.get_mut(&user_id) {
                Some(flag) => {
                    *flag = is_admin;
                    true
                }
                None => false,
            }
        }

        /// Make every subsequent call fail as if the backend were down.
        pub fn set_unavailable(&self, down: bool) {
            self.unavailable.store(down, Ordering::SeqCst);
        }

        pub fn password_hash(&self, email: &str) -> Option<String> {
            self.lock().users.get(email).map(|u| u.password_hash.clone())
        }

        fn lock(&self) -> MutexGuard<'_, State> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }

        fn check_available(&self) -> Result<(), StoreError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("mock store is down".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CredentialStore for MockCredentialStore {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
            self.check_available()?;
            Ok(self.lock().users.get(email).cloned())
        }

        async fn create_user(&self, email: &str, password_hash: &str) -> Result<i64, StoreError> {
            self.check_available()?;
            let mut state = self.lock();
            if state.users.contains_key(email) {
                return Err(StoreError::Conflict);
            }
            state.last_id += 1;
            let id = state.last_id;
            let user = User { id, email: email.to_string(), password_hash: password_hash.to_string() };
            state.users.insert(email.to_string(), user);
            state.admins.insert(id, false);
            Ok(id)
        }

        async fn find_app(&self, app_id: i32) -> Result<Option<App>, StoreError> {
            self.check_available()?;
            Ok(self.lock().apps.get(&app_id).cloned())
        }

        async fn is_admin(&self, user_id: i64) -> Result<Option<bool>, StoreError> {
            self.check_available()?;
            Ok(self.lock().admins.get(&user_id).copied())
        }
    }
}
