//! Salted, deliberately slow password hashing (Argon2id, PHC string format).

use argon2::{
    password_hash::{Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use configs::HashingSettings;
use rand::rngs::OsRng;

use super::errors::AuthError;

/// Argon2id cost parameters used for new hashes.
///
/// Verification always uses the parameters embedded in the stored hash, so
/// raising the cost later does not lock out existing users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHashing {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordHashing {
    fn default() -> Self {
        Self { memory_kib: Params::DEFAULT_M_COST, iterations: Params::DEFAULT_T_COST, parallelism: Params::DEFAULT_P_COST }
    }
}

impl From<&HashingSettings> for PasswordHashing {
    fn from(s: &HashingSettings) -> Self {
        Self { memory_kib: s.memory_kib, iterations: s.iterations, parallelism: s.parallelism }
    }
}

impl PasswordHashing {
    fn argon2(&self) -> Result<Argon2<'static>, AuthError> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| AuthError::Hash(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hash `password` with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hash(e.to_string()))?
            .to_string();
        Ok(hash)
    }
}

/// Check `password` against a stored PHC hash. The digest comparison is
/// constant-time.
///
/// `Ok(false)` means a mismatch; `Err` means the stored hash is unusable.
pub fn verify(password: &str, stored_hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| AuthError::Hash(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(e) => Err(AuthError::Hash(e.to_string())),
    }
}
