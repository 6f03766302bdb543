//! Per-app access tokens: HS256 JWTs signed with the app's secret.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::domain::{App, User};
use super::errors::AuthError;

/// Claims carried by every token. `exp` is a unix timestamp in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub uid: i64,
    pub email: String,
    pub app_id: i32,
    pub exp: i64,
}

/// Sign a token for `user` scoped to `app`, valid for `ttl` from now.
pub fn issue(user: &User, app: &App, ttl: Duration) -> Result<String, AuthError> {
    if app.secret.is_empty() {
        return Err(AuthError::Token(format!("app {} has no signing secret", app.id)));
    }
    let ttl = chrono::Duration::from_std(ttl).map_err(|e| AuthError::Token(e.to_string()))?;
    let exp = Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| AuthError::Token("token expiry out of range".into()))?;
    let claims = TokenClaims { uid: user.id, email: user.email.clone(), app_id: app.id, exp: exp.timestamp() };
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(app.secret.as_bytes()))
        .map_err(|e| AuthError::Token(e.to_string()))
}

/// Check signature and expiry of `token` against an app secret and return its claims.
pub fn verify(token: &str, secret: &str) -> Result<TokenClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp"]);
    decode::<TokenClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::Token(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User { id: 1, email: "a@x.com".into(), password_hash: "irrelevant".into() }
    }

    fn app() -> App {
        App { id: 7, name: "billing".into(), secret: "billing-secret".into() }
    }

    #[test]
    fn issued_token_carries_identity_and_expiry() {
        let before = Utc::now().timestamp();
        let token = issue(&user(), &app(), Duration::from_secs(3600)).unwrap();
        let after = Utc::now().timestamp();

        let claims = verify(&token, "billing-secret").unwrap();
        assert_eq!(claims.uid, 1);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.app_id, 7);
        assert!(claims.exp >= before + 3600 && claims.exp <= after + 3600);
    }

    #[test]
    fn other_app_secret_cannot_verify() {
        let token = issue(&user(), &app(), Duration::from_secs(60)).unwrap();
        assert!(matches!(verify(&token, "another-secret"), Err(AuthError::Token(_))));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let token = issue(&user(), &app(), Duration::from_secs(60)).unwrap();
        let forged_user = User { id: 2, email: "b@x.com".into(), ..user() };
        let forged_app = App { secret: "attacker".into(), ..app() };
        let forged = issue(&forged_user, &forged_app, Duration::from_secs(60)).unwrap();

        // keep the genuine signature, swap in the forged payload
        let genuine: Vec<&str> = token.split('.').collect();
        let payload = forged.split('.').nth(1).unwrap();
        let spliced = format!("{}.{}.{}", genuine[0], payload, genuine[2]);
        assert!(matches!(verify(&spliced, "billing-secret"), Err(AuthError::Token(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = TokenClaims { uid: 1, email: "a@x.com".into(), app_id: 7, exp: Utc::now().timestamp() - 3600 };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(b"billing-secret")).unwrap();
        assert!(matches!(verify(&token, "billing-secret"), Err(AuthError::Token(_))));
    }

    #[test]
    fn out_of_range_ttl_is_an_error() {
        let res = issue(&user(), &app(), Duration::from_secs(9_000_000_000_000));
        assert!(matches!(res, Err(AuthError::Token(_))));
    }

    #[test]
    fn empty_secret_refuses_to_sign() {
        let unsigned = App { secret: String::new(), ..app() };
        assert!(matches!(issue(&user(), &unsigned, Duration::from_secs(60)), Err(AuthError::Token(_))));
    }
}
