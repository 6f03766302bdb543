//! Persistence layer of the credential store: `sea-orm` entities for users
//! and client apps plus connection pooling.

pub mod errors;
pub mod db;
pub mod user;
pub mod app;
