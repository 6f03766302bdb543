use thiserror::Error;

/// Failures reported by a credential store implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A write hit a uniqueness constraint.
    #[error("unique constraint violated")]
    Conflict,
    /// Anything else: connectivity, timeouts, corrupted rows.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Business errors for auth workflows.
///
/// The boundary matches on the variant; messages carried by internal variants
/// are for logs only and must not reach clients.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("user not found")]
    UserNotFound,
    #[error("app not found")]
    AppNotFound,
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("hashing error: {0}")]
    Hash(String),
    #[error("token error: {0}")]
    Token(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::InvalidInput(_) => 1001,
            AuthError::InvalidCredentials => 1002,
            AuthError::UserAlreadyExists => 1003,
            AuthError::UserNotFound => 1004,
            AuthError::AppNotFound => 1005,
            AuthError::StoreUnavailable(_) => 1200,
            AuthError::Hash(_) => 1101,
            AuthError::Token(_) => 1102,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            // user creation is the only write the service performs
            StoreError::Conflict => AuthError::UserAlreadyExists,
            StoreError::Unavailable(msg) => AuthError::StoreUnavailable(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let all = [
            AuthError::InvalidInput("x"),
            AuthError::InvalidCredentials,
            AuthError::UserAlreadyExists,
            AuthError::UserNotFound,
            AuthError::AppNotFound,
            AuthError::StoreUnavailable("down".into()),
            AuthError::Hash("bad".into()),
            AuthError::Token("bad".into()),
        ];
        let mut codes: Vec<u16> = all.iter().map(AuthError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn store_errors_keep_their_kind() {
        assert_eq!(AuthError::from(StoreError::Conflict), AuthError::UserAlreadyExists);
        assert_eq!(
            AuthError::from(StoreError::Unavailable("pool timed out".into())),
            AuthError::StoreUnavailable("pool timed out".into())
        );
    }
}
