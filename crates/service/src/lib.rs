//! Authentication core of the SSO service.
//! - Verifies credentials and issues per-app signed tokens.
//! - Registers users and answers admin-privilege queries.
//! - Talks to persistence only through the `CredentialStore` trait.

pub mod auth;
#[cfg(test)]
pub mod test_support;
