//! Auth module: domain types, store abstraction, hashing and token policy, and
//! the service orchestrating login, registration and admin checks.

pub mod domain;
pub mod errors;
pub mod password;
pub mod repository;
pub mod repo;
pub mod service;
pub mod token;

pub use errors::{AuthError, StoreError};
pub use repository::CredentialStore;
pub use service::{AuthConfig, AuthService};
